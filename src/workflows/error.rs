use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Field-level rejections raised before any record is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("city must not be empty")]
    EmptyCity,
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("unknown province '{0}'")]
    UnknownProvince(String),
    #[error("at most {max} images allowed, got {found}")]
    TooManyImages { max: usize, found: usize },
    #[error("reason must be at least {min} characters, got {found}")]
    ReasonTooShort { min: usize, found: usize },
    #[error("review notes must not be empty")]
    EmptyReviewNotes,
    #[error("site name must not be empty")]
    EmptySiteName,
}

/// The one error surface every workflow operation shares.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(what) => Self::Conflict(what),
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Store(other),
        }
    }
}

impl WorkflowError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Unauthenticated => StatusCode::UNAUTHORIZED,
            WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
            WorkflowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Conflict(_) => StatusCode::CONFLICT,
            WorkflowError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
