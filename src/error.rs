//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;

use crate::pnl::responses::PnlErrorResponse;

/// Input outside the domain the engine expects
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Decimal },

    #[error("{field} must have at most {places} decimal places")]
    TooPrecise { field: String, places: u32 },

    #[error("{field} has an invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} contains duplicate value '{value}'")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Negative { field }
            | ValidationError::NotPositive { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::TooPrecise { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

/// Persistence failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid record key: {0:?}")]
    InvalidKey(String),
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::Store(_) => "store_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found"), None),
            AppError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.to_string(),
                Some(serde_json::json!({ "field": e.field() })),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Store error".to_string(),
                    None,
                )
            }
        };

        let body = PnlErrorResponse {
            error_type: self.error_type().to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
