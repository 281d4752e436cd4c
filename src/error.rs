//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Account {account_id} currency mismatch: {account_currency} -> {requested}")]
    CurrencyMismatch {
        account_id: i64,
        account_currency: String,
        requested: String,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    // Storage errors, mapped per kind in `into_response`
    #[error(transparent)]
    Store(#[from] StoreError),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<crate::password::PasswordError> for AppError {
    fn from(err: crate::password::PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::UnsupportedCurrency(code) => (
                StatusCode::BAD_REQUEST,
                "unsupported_currency",
                Some(code.clone()),
            ),
            AppError::CurrencyMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                "currency_mismatch",
                Some(self.to_string()),
            ),

            // 404 Not Found
            AppError::AccountNotFound(id) => (
                StatusCode::NOT_FOUND,
                "account_not_found",
                Some(id.to_string()),
            ),

            // Storage errors - map to appropriate HTTP status
            AppError::Store(ref store_err) => match store_err {
                StoreError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),
                StoreError::Constraint(msg) => (
                    StatusCode::FORBIDDEN,
                    "constraint_violation",
                    Some(msg.clone()),
                ),
                StoreError::Conflict(msg) => (
                    StatusCode::CONFLICT,
                    "transaction_conflict",
                    Some(msg.clone()),
                ),
                StoreError::RollbackFailed { .. } | StoreError::Database(_) => {
                    tracing::error!("Database error: {:?}", store_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
