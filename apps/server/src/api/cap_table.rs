use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use flexile_core::cap_table::{CapTable, CapTableImport};

use crate::{error::ApiResult, main_lib::AppState};

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/cap-table",
    params(("company_id" = String, Path, description = "Company identifier")),
    responses((status = 200, description = "Investors, share classes, holdings and convertibles"))
)]
pub async fn get_cap_table(
    Path(company_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CapTable>> {
    let cap_table = state.cap_table_service.get_cap_table(&company_id)?;
    Ok(Json(cap_table))
}

#[utoipa::path(
    post,
    path = "/api/v1/companies/{company_id}/cap-table",
    params(("company_id" = String, Path, description = "Company identifier")),
    responses(
        (status = 201, description = "Cap table after the import"),
        (status = 400, description = "Invalid import")
    )
)]
pub async fn import_cap_table(
    Path(company_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(import): Json<CapTableImport>,
) -> ApiResult<(StatusCode, Json<CapTable>)> {
    let cap_table = state
        .cap_table_service
        .import_cap_table(&company_id, import)
        .await?;
    Ok((StatusCode::CREATED, Json(cap_table)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/companies/{company_id}/cap-table",
        get(get_cap_table).post(import_cap_table),
    )
}
