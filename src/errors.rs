use crate::services::error::ServiceError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Failure envelope returned by every handler: `{success: false, message, error}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub error: String,
}

impl AppError {
    /// Create a new AppError with a specific status, message and error detail.
    pub fn new(status: StatusCode, msg: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            error: error.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg, error)
    }

    /// Shortcut for a 400 Bad Request
    pub fn bad_request(msg: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg, error)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg, error)
    }

    /// Translate a service failure. `context` is the message used when the
    /// store itself failed; the store's error text is passed through as-is.
    pub fn from_service(err: ServiceError, context: &str) -> Self {
        let detail = err.to_string();
        match err {
            ServiceError::InvalidIdentifier(_) => Self::bad_request("Invalid ID format", detail),
            ServiceError::InvalidPayload(_) => Self::bad_request("Invalid request body", detail),
            ServiceError::CarAlreadyBooked(_) => Self::bad_request("Car is already booked", detail),
            ServiceError::CarHasActiveBooking(_) => {
                Self::bad_request("Car has an active booking and cannot be deleted", detail)
            }
            ServiceError::CarNotFound(_) => Self::not_found("Car not found", detail),
            ServiceError::BookingNotFound(_) => Self::not_found("Booking not found", detail),
            ServiceError::Sqlx(_) => Self::internal(context, detail),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.error, "{}", self.message);
        } else {
            tracing::warn!(status = self.status.as_u16(), error = %self.error, "{}", self.message);
        }

        let body = Json(json!({
            "success": false,
            "message": self.message,
            "error": self.error,
        }));

        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request("Invalid request body", rejection.body_text())
    }
}
