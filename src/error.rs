// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
// endregion: --- Imports

// region:    --- Market Error

/// Errors surfaced to API callers as `{"error": "..."}` JSON.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Missing or malformed request fields, or a bid below the floor.
    #[error("{0}")]
    Validation(String),

    /// No caller identity supplied.
    #[error("Authentication required")]
    Authentication,

    /// Authenticated but not an admin.
    #[error("Admin access required")]
    Authorization,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The target exists but cannot accept the operation.
    #[error("{0}")]
    InvalidState(&'static str),

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("file storage failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The conditional bid append kept losing the race.
    #[error("bid append retries exhausted")]
    Contention,
}

impl MarketError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Validation(_) | MarketError::InvalidState(_) => StatusCode::BAD_REQUEST,
            MarketError::Authentication => StatusCode::UNAUTHORIZED,
            MarketError::Authorization => StatusCode::FORBIDDEN,
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::Storage(_)
            | MarketError::Io(_)
            | MarketError::Upstream(_)
            | MarketError::Contention => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal failures are logged in full; the caller only sees a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{:<12} --> {}", "Error", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// endregion: --- Market Error

// endregion: --- Tests
