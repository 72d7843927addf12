use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::payment_service::PaymentError;

/// Field name to human readable problem, reported under `error.details`.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("Invalid input data")]
    Validation(FieldErrors),

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn room_not_found() -> Self {
        Self::not_found("ROOM_NOT_FOUND", "Room not found")
    }

    pub fn booking_not_found() -> Self {
        Self::not_found("BOOKING_NOT_FOUND", "Booking not found")
    }

    /// A guarded status write found the booking in another status than it was read in.
    pub fn status_changed() -> Self {
        Self::conflict(
            "STATUS_CHANGED",
            "The booking was changed by another request, reload it and retry",
        )
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut details = FieldErrors::new();
        details.insert(field.to_string(), message.into());
        Self::Validation(details)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest { .. } | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Payment(PaymentError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Payment(_) => StatusCode::BAD_GATEWAY,
            AppError::Db(_) | AppError::Internal(_) | AppError::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::BadRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. } => code,
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Payment(PaymentError::NotConfigured) => "PAYMENT_UNAVAILABLE",
            AppError::Payment(_) => "PAYMENT_ERROR",
            AppError::Db(_) | AppError::Internal(_) | AppError::Anyhow(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures are logged in full and reported generically.
        let message = match &self {
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                "An unexpected error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "An unexpected error occurred".to_string()
            }
            AppError::Anyhow(e) => {
                tracing::error!(error = ?e, "unhandled error");
                "An unexpected error occurred".to_string()
            }
            AppError::Payment(e) => {
                tracing::warn!(error = %e, "payment provider failure");
                match e {
                    PaymentError::NotConfigured => {
                        "Online payment is currently unavailable".to_string()
                    }
                    _ => "The payment provider rejected the request".to_string(),
                }
            }
            other => other.to_string(),
        };

        let details = match &self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        };

        (
            status,
            Json(ErrorEnvelope {
                success: false,
                error: ErrorBody {
                    code: self.code(),
                    message,
                    details,
                },
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request("INVALID_INPUT", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request("INVALID_INPUT", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request("INVALID_INPUT", rejection.body_text())
    }
}
