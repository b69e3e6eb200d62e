//! Error handling module
//!
//! This module provides centralized error handling for the application.

use crate::domain::payments::OrderStatus;
use crate::shared::validation::ValidationFailure;
use serde_json::Value;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(ValidationFailure),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Payment signature verification failed")]
    Signature,

    #[error("Payment order not found: {remote_order_id}")]
    NotFound { remote_order_id: String },

    #[error("Payment order {remote_order_id} already finalized as {status}")]
    Conflict { remote_order_id: String, status: OrderStatus },

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration_error",
            AppError::Validation(_) => "validation_failed",
            AppError::Gateway(_) => "gateway_error",
            AppError::Signature => "verification_failed",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "already_finalized",
            AppError::Store(_) => "store_error",
            AppError::Json(_) => "invalid_json",
            AppError::RateLimit => "rate_limited",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;

        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Signature => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body returned to HTTP clients.
    ///
    /// Signature and lookup failures sit on the callback trust boundary and only
    /// ever carry a fixed message. Store, config and internal errors are logged
    /// server-side and never echoed.
    pub fn to_public_json(&self) -> Value {
        let message = match self {
            AppError::Validation(failure) => {
                return serde_json::json!({
                    "error": self.code(),
                    "message": "One or more fields are invalid",
                    "fields": failure.fields(),
                });
            }
            AppError::Gateway(msg) => format!("Payment gateway request failed: {}", msg),
            AppError::Signature => "Payment verification failed".to_string(),
            AppError::NotFound { .. } => "Payment record not found".to_string(),
            AppError::Conflict { .. } => "Payment already finalized".to_string(),
            AppError::Json(_) => "Malformed request body".to_string(),
            AppError::RateLimit => "Rate limit exceeded".to_string(),
            AppError::Config(_) | AppError::Store(_) | AppError::Internal(_) => {
                "Internal error".to_string()
            }
        };

        serde_json::json!({
            "error": self.code(),
            "message": message,
        })
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

// Implement warp::reject::Reject for AppError
impl warp::reject::Reject for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Gateway("request timed out".to_string())
        } else {
            AppError::Gateway(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(ValidationFailure::from(&errors))
    }
}
