use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::application::error::ApplicationError;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            ApplicationError::MissingField(msg) => {
                warn!("Missing field: {}", msg);
                (StatusCode::BAD_REQUEST, msg, None)
            }
            ApplicationError::InvalidArchive { reason, details } => {
                warn!("Invalid archive: {} ({:?})", reason, details);
                (StatusCode::BAD_REQUEST, reason, details)
            }
            ApplicationError::NoMatchingFiles => {
                warn!("Archive contains no SVG files");
                (
                    StatusCode::BAD_REQUEST,
                    "No SVG files found in ZIP".to_string(),
                    None,
                )
            }
            ApplicationError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, None)
            }
            ApplicationError::PayloadTooLarge => {
                warn!("Upload exceeds the request size limit");
                (StatusCode::PAYLOAD_TOO_LARGE, "File too large".to_string(), None)
            }
            ApplicationError::InternalError(msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(msg),
                )
            }
        };

        let body = match details {
            Some(details) => json!({ "error": error_message, "details": details }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Turns a handler panic into the regular 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "Handler panicked".to_string()
    };

    ApplicationError::InternalError(message).into_response()
}
