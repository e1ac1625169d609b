//! Error types for the gateway HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors returned by gateway handlers as `{"error": "..."}` JSON.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    #[error("{0}")]
    Board(#[from] board::BoardError),

    #[error("{0}")]
    Admin(#[from] admin_commands::AdminError),

    #[error("{0}")]
    BadRequest(String),

    #[error("invalid token")]
    Unauthorized,

    #[error("invalid api key")]
    InvalidApiKey,

    #[error("{0} not found")]
    NotFound(String),

    /// A setting needed by this endpoint is missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The provider rejected the request.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Database(database::DatabaseError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            GatewayError::Database(err) => {
                tracing::error!("Database error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Board(board::BoardError::Database(err)) => {
                tracing::error!("Board database error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Board(_) => StatusCode::BAD_REQUEST,
            GatewayError::Admin(admin_commands::AdminError::InvalidPassword(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GatewayError::Admin(err) => {
                tracing::error!("Admin error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Unauthorized | GatewayError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::NotConfigured(name) => {
                tracing::error!("{} is not configured", name);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Provider { status, .. } => provider_status(*status),
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Provider client errors pass through; everything else, including the
/// synthetic network-failure status, is a bad gateway.
fn provider_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() => code,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;
