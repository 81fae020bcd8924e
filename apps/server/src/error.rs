use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flexile_core::errors::{AllocationError, DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        CoreError::Database(DatabaseError::ForeignKeyViolation(_)) => StatusCode::BAD_REQUEST,
        CoreError::Allocation(AllocationError::ComputationAlreadyFinalized { .. }) => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Core(err) = &self;
        let status = core_status(err);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use flexile_core::errors::ValidationError;

    #[test]
    fn test_core_errors_map_to_statuses() {
        assert_eq!(
            core_status(&ValidationError::MissingField("amount".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            core_status(&DatabaseError::NotFound("computation".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            core_status(
                &AllocationError::ComputationAlreadyFinalized {
                    computation_id: "c".into(),
                    dividend_round_id: "r".into(),
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            core_status(
                &AllocationError::ConvertibleInvestmentNotFound {
                    entity_name: "Seed SAFE".into(),
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
