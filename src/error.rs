//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::address::AddressError;
use crate::storage::EngineError;

// == Gateway Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request path does not resolve to a (table, item) address
    #[error("Bad address: {0}")]
    BadAddress(String),

    /// PATCH without a body
    #[error("Request body is empty")]
    EmptyBody,

    /// PATCH body is not valid JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Item is absent on read
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Item is absent on PATCH and creation through PATCH is disabled
    #[error("Item not found and PATCH may not create it: {0}")]
    NotFoundOnPatch(String),

    /// HTTP method other than GET or PATCH
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The persistent engine rejected or failed an operation
    #[error("Persistence failure: {0}")]
    Persistence(#[from] EngineError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// HTTP status this error is surfaced as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadAddress(_)
            | GatewayError::EmptyBody
            | GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) | GatewayError::NotFoundOnPatch(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Persistence(_) | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AddressError> for GatewayError {
    fn from(err: AddressError) -> Self {
        GatewayError::BadAddress(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        if let GatewayError::MethodNotAllowed(_) = self {
            return (status, [(header::ALLOW, "GET, PATCH")], body).into_response();
        }

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
