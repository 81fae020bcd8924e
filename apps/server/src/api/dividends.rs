use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use flexile_core::dividends::{
    DistributionRequest, DividendComputation, DividendComputationDetails, DividendRound,
    DividendRoundWithDividends, ExportVariant,
};

use crate::{error::ApiResult, main_lib::AppState};

#[utoipa::path(
    post,
    path = "/api/v1/companies/{company_id}/dividend-computations",
    params(("company_id" = String, Path, description = "Company identifier")),
    responses(
        (status = 201, description = "Stored computation"),
        (status = 400, description = "Invalid distribution request")
    )
)]
pub async fn create_computation(
    Path(company_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<DistributionRequest>,
) -> ApiResult<(StatusCode, Json<DividendComputation>)> {
    let computation = state
        .dividend_service
        .create_computation(&company_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(computation)))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/dividend-computations",
    params(("company_id" = String, Path, description = "Company identifier")),
    responses((status = 200, description = "Computations, newest first"))
)]
pub async fn list_computations(
    Path(company_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DividendComputation>>> {
    let computations = state.dividend_service.list_computations(&company_id)?;
    Ok(Json(computations))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/dividend-computations/{id}",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ("id" = String, Path, description = "Computation identifier")
    ),
    responses(
        (status = 200, description = "Computation with outputs and payouts"),
        (status = 404, description = "Unknown computation")
    )
)]
pub async fn get_computation(
    Path((company_id, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DividendComputationDetails>> {
    let details = state
        .dividend_service
        .get_computation_details(&company_id, &id)?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/dividend-computations/{id}/exports/{variant}",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ("id" = String, Path, description = "Computation identifier"),
        ("variant" = String, Path, description = "by-security, by-investor or final")
    ),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 400, description = "Unknown export variant")
    )
)]
pub async fn export_computation(
    Path((company_id, id, variant)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let variant: ExportVariant = variant.parse()?;
    let csv = state
        .dividend_service
        .export_csv(&company_id, &id, variant)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", variant.file_name(&id)),
            ),
        ],
        csv,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/companies/{company_id}/dividend-computations/{id}/finalize",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ("id" = String, Path, description = "Computation identifier")
    ),
    responses(
        (status = 201, description = "Dividend round created"),
        (status = 409, description = "Computation already finalized")
    )
)]
pub async fn finalize_computation(
    Path((company_id, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<DividendRound>)> {
    let round = state
        .dividend_service
        .finalize_computation(&company_id, &id)
        .await?;
    Ok((StatusCode::CREATED, Json(round)))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/dividend-rounds/{id}",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ("id" = String, Path, description = "Dividend round identifier")
    ),
    responses(
        (status = 200, description = "Round with its dividends"),
        (status = 404, description = "Unknown round")
    )
)]
pub async fn get_round(
    Path((company_id, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DividendRoundWithDividends>> {
    let round = state.dividend_service.get_round(&company_id, &id)?;
    Ok(Json(round))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/companies/{company_id}/dividend-computations",
            get(list_computations).post(create_computation),
        )
        .route(
            "/companies/{company_id}/dividend-computations/{id}",
            get(get_computation),
        )
        .route(
            "/companies/{company_id}/dividend-computations/{id}/exports/{variant}",
            get(export_computation),
        )
        .route(
            "/companies/{company_id}/dividend-computations/{id}/finalize",
            post(finalize_computation),
        )
        .route("/companies/{company_id}/dividend-rounds/{id}", get(get_round))
}
