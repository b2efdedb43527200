//! Error-to-response translation.
//!
//! Handlers return `Result<_, ApiError>`. `Ok` responses pass through
//! untouched; every error becomes `{"error": "<message>"}` with content type
//! `application/problem+json` and the status of its class.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::board::{CatalogError, ReconcileError};

pub const PROBLEM_JSON: &str = "application/problem+json";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Target name or id did not resolve.
    #[error("{0}")]
    NotFound(String),

    /// Malformed body or out-of-range value.
    #[error("{0}")]
    Validation(String),

    /// PATCH addressed a service that does not exist.
    #[error("Service {0} is not supported, please create this service first")]
    UnknownService(String),

    #[error("{0}")]
    Conflict(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("Database connection error: {0}")]
    Storage(String),

    /// A handler panicked and was recovered.
    #[error("internal server error")]
    InternalFault,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::UnknownService(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage(_) | ApiError::InternalFault => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = serde_json::json!({ "error": message }).to_string();
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON))],
            body,
        )
            .into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) | CatalogError::UnknownId(_) => ApiError::NotFound(err.to_string()),
            CatalogError::Validation(msg) => ApiError::Validation(msg),
            CatalogError::Conflict(_) => ApiError::Conflict(err.to_string()),
            CatalogError::Store(e) => ApiError::Storage(e.to_string()),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::ServiceNotFound(name) => ApiError::UnknownService(name),
            ReconcileError::InvalidStatus { .. } => ApiError::Validation(err.to_string()),
            ReconcileError::Store(e) => ApiError::Storage(e.to_string()),
        }
    }
}
