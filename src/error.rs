//! Error types for Ordena server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Validation kinds for order create/update failures.
///
/// Each kind maps to the request field it concerns so the API can return
/// field-keyed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderErrorKind {
    DatesInvalid,
    StatusInvalid,
    ClientInvalid,
    ClientLocationInvalid,
    ServiceLocationInvalid,
    AvailabilityMissing,
    Overlap,
    DurationNotMultiple,
}

impl OrderErrorKind {
    /// The request field the kind is reported under.
    pub fn field(&self) -> &'static str {
        match self {
            OrderErrorKind::DatesInvalid => "dates",
            OrderErrorKind::StatusInvalid => "status",
            OrderErrorKind::ClientInvalid => "client",
            OrderErrorKind::ClientLocationInvalid => "client_location",
            OrderErrorKind::ServiceLocationInvalid => "service_location",
            OrderErrorKind::AvailabilityMissing => "availability",
            OrderErrorKind::Overlap => "overlap",
            OrderErrorKind::DurationNotMultiple => "duration",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderErrorKind::DatesInvalid => "dates_invalid",
            OrderErrorKind::StatusInvalid => "status_invalid",
            OrderErrorKind::ClientInvalid => "client_invalid",
            OrderErrorKind::ClientLocationInvalid => "client_location_invalid",
            OrderErrorKind::ServiceLocationInvalid => "service_location_invalid",
            OrderErrorKind::AvailabilityMissing => "availability_missing",
            OrderErrorKind::Overlap => "overlap",
            OrderErrorKind::DurationNotMultiple => "duration_not_multiple",
        }
    }
}

impl std::fmt::Display for OrderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed availability-generation request.
    #[error("Availability error: {0}")]
    Availability(String),

    /// Malformed calendar read request.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Order validation failure with a typed kind.
    #[error("Order validation error ({kind}): {message}")]
    OrderValidation {
        kind: OrderErrorKind,
        message: String,
    },

    /// Internal failure during slot generation or persistence. Logged and
    /// retried by the next scheduled run; never surfaced to end users.
    #[error("Regeneration error: {0}")]
    Regeneration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for an order validation failure.
    pub fn order(kind: OrderErrorKind, message: impl Into<String>) -> Self {
        AppError::OrderValidation {
            kind,
            message: message.into(),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Field-keyed error response body for order validation failures
#[derive(Serialize, utoipa::ToSchema)]
pub struct FieldErrorResponse {
    #[schema(value_type = Object)]
    pub errors: serde_json::Map<String, serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::OrderValidation { kind, message } => {
                let mut errors = serde_json::Map::new();
                errors.insert(
                    kind.field().to_string(),
                    serde_json::Value::String(message.clone()),
                );
                return (StatusCode::BAD_REQUEST, Json(FieldErrorResponse { errors }))
                    .into_response();
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Database error".to_string(),
                    }),
                )
                    .into_response();
            }
            AppError::Internal(msg) | AppError::Regeneration(msg) => {
                tracing::error!("Internal error: {}", msg);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Internal server error".to_string(),
                    }),
                )
                    .into_response();
            }
            _ => {}
        }

        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg)
            | AppError::Availability(msg)
            | AppError::Calendar(msg)
            | AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            _ => unreachable!("handled above"),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
