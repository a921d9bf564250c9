//! Mapping from failures to HTTP responses
//!
//! Every handler returns `Result<_, AppError>`. Store internals are logged
//! here and replaced by a generic message before leaving the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::model::{ApiResponse, ErrorBody};
use crate::store::StoreError;

pub const NOT_FOUND_MESSAGE: &str = "Video not found.";
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One message per invalid field
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => AppError::Validation(e.messages),
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation(messages) => {
                tracing::debug!(?messages, "rejected invalid video");
                (StatusCode::BAD_REQUEST, ErrorBody::Messages(messages))
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody::Message(NOT_FOUND_MESSAGE.to_string()),
            ),
            AppError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::Message(SERVER_ERROR_MESSAGE.to_string()),
                )
            }
        };

        (status, Json(ApiResponse::error(error))).into_response()
    }
}
