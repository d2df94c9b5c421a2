//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers, rendered as a JSON body.
///
/// Client errors carry `{"error"}`; server errors add `{"details"}`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationFailed(message)
            | AppError::MalformedInput(message)
            | AppError::InvalidArgument(message)
            | AppError::InvalidItem(message) => Self::bad_request(message),
            AppError::NotFound(message) => Self {
                status: StatusCode::NOT_FOUND,
                message: format!("{} not found", message),
                details: None,
            },
            other => {
                tracing::error!("Internal error: {}", other);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                    details: Some(other.to_string()),
                }
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                StatusCode::BAD_REQUEST
            }
            other => other,
        };
        Self {
            status,
            message: rejection.body_text(),
            details: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
