use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::db::StorageError;
use crate::fetcher::FetchError;

/// Every failure a request can end in. Each variant maps to exactly one status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("article not found")]
    NotFound,
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Fetch(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing reason. Never carries driver or transport internals.
    fn detail(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound => "Article not found".to_string(),
            AppError::Fetch(FetchError::Upstream { status }) => {
                format!("Article source responded with HTTP {}", status)
            }
            AppError::Fetch(err) if err.is_timeout() => {
                "Timed out fetching article source".to_string()
            }
            AppError::Fetch(FetchError::Transport(_)) => {
                "Could not reach article source".to_string()
            }
            AppError::Fetch(FetchError::Parse(_)) => {
                "Article source returned an invalid payload".to_string()
            }
            AppError::Storage(_) => "Internal server error".to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Storage(_) => error!("Request failed: {}", self),
            AppError::Fetch(_) => warn!("Request failed: {}", self),
            _ => debug!("Request rejected: {}", self),
        }

        (
            status,
            Json(ErrorBody {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}
