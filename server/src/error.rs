use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::pricing::Quote;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Cart total does not match server pricing")]
    PriceMismatch(Quote),

    #[error("Upstream service error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Counter error: {0}")]
    Counter(#[from] redis::RedisError),

    #[error("Search error: {0}")]
    Search(#[from] meilisearch_sdk::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } | AppError::Invalid { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } | AppError::PriceMismatch { .. } => StatusCode::CONFLICT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Database { .. }
            | AppError::Counter { .. }
            | AppError::Search { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{self}");
        }

        // The mismatch response carries the authoritative quote so the
        // storefront can refresh its cart totals in place.
        if let AppError::PriceMismatch(quote) = &self {
            return (
                status,
                Json(json!({ "message": self.to_string(), "quote": quote })),
            )
                .into_response();
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
