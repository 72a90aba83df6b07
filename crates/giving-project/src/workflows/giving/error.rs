use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::export::ExportError;
use super::pipeline::TransitionError;
use super::repository::RepositoryError;
use super::validation::ValidationErrors;

/// Error raised by the pipeline, stats and cohort services.
#[derive(Debug, thiserror::Error)]
pub enum GivingError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("operation failed: {0}")]
    OperationFailed(#[source] RepositoryError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("{0} total exceeds the supported range")]
    Overflow(&'static str),
}

impl GivingError {
    pub(crate) fn denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied(reason.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GivingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GivingError::Transition(_) | GivingError::Conflict(_) => StatusCode::CONFLICT,
            GivingError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            GivingError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GivingError::NotFound { .. } => StatusCode::NOT_FOUND,
            GivingError::OperationFailed(_)
            | GivingError::Export(_)
            | GivingError::Overflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for GivingError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => Self::Conflict("record already exists".to_string()),
            RepositoryError::Stale { .. } => Self::Conflict(value.to_string()),
            RepositoryError::NotFound => Self::Conflict("record no longer exists".to_string()),
            RepositoryError::Unavailable(_) => Self::OperationFailed(value),
        }
    }
}

impl IntoResponse for GivingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            GivingError::Validation(errors) => json!({
                "error": "validation failed",
                "fields": errors.fields,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
