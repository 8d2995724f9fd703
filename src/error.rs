use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Template render error: {0}")]
    Template(#[from] askama::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DirectoryError {
    /// Unique-key rejection raised by the backend on insert.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DirectoryError::Database(SqlxError::Database(db)) if db.is_unique_violation()
        )
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "request failed");
        let (status, error_body) = match self {
            DirectoryError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A storage error occurred.".to_string(),
                },
            ),
            DirectoryError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "CANCELLED".to_string(),
                    message: "The server is shutting down.".to_string(),
                },
            ),
            DirectoryError::UrlParse(_)
            | DirectoryError::InvalidDatabaseUrl(_)
            | DirectoryError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
