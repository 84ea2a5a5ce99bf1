use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::{StoreError, Violation};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A request named a user, forum or thread that does not exist
    #[error("Referenced entity not found: {0}")]
    ReferenceNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A post parent is missing or lives in another thread
    #[error("Bad parent: {0}")]
    BadParent(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::ReferenceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::BadParent(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Violation(Violation::MissingReference) => {
                AppError::ReferenceNotFound("Referenced user, forum or thread not found".to_string())
            }
            StoreError::Violation(Violation::UniqueConflict) => {
                AppError::Conflict("Entity already exists".to_string())
            }
            StoreError::Violation(Violation::InvalidParent) => {
                AppError::BadParent("Parent post was created in another thread".to_string())
            }
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match &self {
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::ReferenceNotFound(msg) => ("reference_not_found", msg.clone()),
            AppError::BadRequest(msg) => ("bad_request", msg.clone()),
            AppError::Conflict(msg) => ("conflict", msg.clone()),
            AppError::BadParent(msg) => ("bad_parent", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("database_error", "Database error".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ("internal_error", "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
