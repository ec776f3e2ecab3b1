//! HTTP error mapping
//!
//! Domain errors keep their message; storage failures are logged and
//! replaced by a generic message naming the operation.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use todo_core::TodoError;

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Item not found")]
    NotFound,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Storage(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a core error, using `context` as the message for storage failures
    pub fn from_core(context: &'static str) -> impl FnOnce(TodoError) -> ApiError {
        move |err| match err {
            TodoError::NotFound(_) => ApiError::NotFound,
            TodoError::InvalidInput(message) => ApiError::InvalidInput(message),
            TodoError::Storage(e) => {
                tracing::error!(error = %e, "{}", context);
                ApiError::Storage(context)
            }
        }
    }
}

/// Undecodable bodies are client errors like any other validation failure
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
