//! API error handling
//!
//! Domain errors are mapped to a status code and a JSON body of the form
//! `{"error": "...", "message": "...", "field": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_billing::BillingError;
use domain_reporting::ReportError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        field: Option<String>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a validation error on a named field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, field) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Conflict { message, field } => ("conflict", message, field),
            ApiError::Validation { message, field } => ("validation_error", message, field),
            ApiError::Unavailable(msg) => ("unavailable", msg, None),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                ("internal_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            e @ PortError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            PortError::Validation { message, field } => ApiError::Validation { message, field },
            PortError::Conflict { message, field } => ApiError::Conflict { message, field },
            PortError::Connection { message, .. } => ApiError::Unavailable(message),
            PortError::Internal { message, .. } => ApiError::Internal(message),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        let field = err.field_name();
        match err {
            BillingError::Port(e) => e.into(),
            e @ BillingError::InvoiceNotFound(_) => ApiError::NotFound(e.to_string()),
            e @ (BillingError::DuplicateInvoiceNumber(_) | BillingError::CustomerHasInvoices { .. }) => {
                ApiError::Conflict {
                    message: e.to_string(),
                    field,
                }
            }
            e @ BillingError::NumberingExhausted { .. } => ApiError::Internal(e.to_string()),
            e => ApiError::Validation {
                message: e.to_string(),
                field,
            },
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::validation_field(err.to_string(), err.field_name())
    }
}
