//! Error handling module for the dashboard backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CLAIM_REJECTED: &str = "CLAIM_REJECTED";
    pub const GATEWAY_ERROR: &str = "GATEWAY_ERROR";
    pub const NOT_LOADED: &str = "NOT_LOADED";
    pub const CLAIM_IN_PROGRESS: &str = "CLAIM_IN_PROGRESS";
    pub const DISPOSED: &str = "DISPOSED";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Invalid input or configuration
    Validation(String),
    /// The gateway declined a claim
    ClaimRejected(String),
    /// The gateway call failed
    Gateway(String),
    /// No snapshot has been loaded yet
    NotLoaded(String),
    /// A claim for the same benefit is still awaiting the gateway
    ClaimInProgress(String),
    /// The store has been disposed
    Disposed(String),
    /// Database error
    Database(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ClaimRejected(_) => StatusCode::CONFLICT,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::NotLoaded(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ClaimInProgress(_) => StatusCode::CONFLICT,
            AppError::Disposed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::ClaimRejected(_) => codes::CLAIM_REJECTED,
            AppError::Gateway(_) => codes::GATEWAY_ERROR,
            AppError::NotLoaded(_) => codes::NOT_LOADED,
            AppError::ClaimInProgress(_) => codes::CLAIM_IN_PROGRESS,
            AppError::Disposed(_) => codes::DISPOSED,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::ClaimRejected(msg)
            | AppError::Gateway(msg)
            | AppError::NotLoaded(msg)
            | AppError::ClaimInProgress(msg)
            | AppError::Disposed(msg)
            | AppError::Database(msg)
            | AppError::BadRequest(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Storage(msg) => AppError::Database(msg),
            other => AppError::Gateway(other.to_string()),
        }
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub is_loading: bool,
}

impl ErrorResponse {
    pub fn with_details(
        error: &AppError,
        details: Option<serde_json::Value>,
        is_loading: bool,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message().to_string(),
                details,
            },
            is_loading,
        }
    }
}

/// Error carrying the store's loading flag and optional structured details.
pub struct AppErrorWithState {
    pub error: AppError,
    pub details: Option<serde_json::Value>,
    pub is_loading: bool,
}

impl AppErrorWithState {
    pub fn new(error: AppError, is_loading: bool) -> Self {
        Self {
            error,
            details: None,
            is_loading,
        }
    }
}

impl IntoResponse for AppErrorWithState {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::with_details(&self.error, self.details, self.is_loading);
        (status, Json(body)).into_response()
    }
}
