use http::StatusCode;
use serde_json::json;
use spin_sdk::http::Response;
use thiserror::Error;

use crate::core::helpers::json_response;

/// Why a backend call did not produce a usable result.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed. Please log in again.")]
    Unauthenticated,

    #[error("No API route configured for path \"{path}\"")]
    NoRoute { path: String },

    #[error("Request failed with status {}: {message}", .status.as_u16())]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown status").to_string()
        } else {
            body.to_string()
        };
        GatewayError::Status { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Errors that should send the user back to the login screen.
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Unauthenticated)
            || matches!(
                self.status(),
                Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
            )
    }
}

/// Failures of the relay functions, rendered as JSON responses.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to send notification: {error}")]
    DeliveryFailed { error: String, stack: String },

    #[error("Failed to trigger daily notification: {0}")]
    TriggerFailed(String),
}

impl From<RelayError> for Response {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::BadRequest(msg) => json_response(400, &json!({ "message": msg })),
            RelayError::NotFound(msg) => json_response(404, &json!({ "message": msg })),
            RelayError::DeliveryFailed { error, stack } => json_response(
                500,
                &json!({
                    "message": "Failed to send notification",
                    "error": error,
                    "stack": stack,
                }),
            ),
            RelayError::TriggerFailed(error) => json_response(
                500,
                &json!({
                    "message": "Failed to trigger daily notification",
                    "error": error,
                }),
            ),
        }
    }
}
