//! # API Errors
//!
//! [`AppError`] is what every handler returns on failure. Each variant maps
//! to one HTTP status and one machine-readable code, rendered as
//!
//! ```json
//! {"error": {"code": "VALIDATION_ERROR", "message": "...", "details": {"field": "items"}}}
//! ```
//!
//! `details` names the offending request field on 422 responses and is
//! omitted otherwise. Messages of `Internal` errors are logged, never sent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use packs_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::extractors::FieldError;
use crate::state::RegistryError;

/// JSON envelope for every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error code, message and optional structured context.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable code such as `NOT_FOUND` or `VALIDATION_ERROR`.
    pub code: String,
    pub message: String,
    /// `{"field": "<name>"}` for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Build a body without details.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Handler failure.
#[derive(Error, Debug)]
pub enum AppError {
    /// No such resource (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// A request field breaks a business rule (422).
    #[error("validation error: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Body is not valid JSON for the endpoint (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Bearer token missing or wrong (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Request clashes with registry state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Server-side failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let mut body = ErrorBody::new(code, message);
        body.error.details = self.details();
        (status, Json(body)).into_response()
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

/// Core input errors name the request field they came from.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let field = match err {
            ValidationError::NegativeOrderQuantity(_)
            | ValidationError::OrderQuantityTooLarge { .. } => "items",
            ValidationError::NonPositivePackSize(_)
            | ValidationError::EmptyPackSizes
            | ValidationError::PackSizeTooLarge { .. } => "pack_sizes",
        };
        Self::Validation {
            field,
            message: err.to_string(),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) | RegistryError::NoDefault => {
                Self::NotFound(err.to_string())
            }
            RegistryError::DeleteDefault(_) => Self::Conflict(err.to_string()),
        }
    }
}
