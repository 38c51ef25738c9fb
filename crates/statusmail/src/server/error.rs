//! JSON error responses for the HTTP API.
//!
//! Every failure answers `{"success": false, ...}` so the browser scripts
//! can branch on one field.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use statusmail_core::CoreError;

pub const SEND_FAILED: &str = "Email sending failed!";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                message: Some(message.into()),
                missing_fields: Vec::new(),
            },
        }
    }

    /// `{"success": false}` and nothing else.
    pub fn bare(status: StatusCode) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                message: None,
                missing_fields: Vec::new(),
            },
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => {
                Self::new(StatusCode::UNAUTHORIZED, message)
            }
            CoreError::Validation(e) => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody {
                    success: false,
                    message: Some(e.to_string()),
                    missing_fields: e.labels(),
                },
            },
            // Detail was logged where it happened; clients get the generic text.
            CoreError::Delivery { .. } | CoreError::Render { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED)
            }
            other => {
                error!(error = %other, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
