//! Route handlers for the gateway.

pub mod admin;
pub mod auth;
pub mod board;
pub mod health;
pub mod instance;
pub mod webhook;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
///
/// Everything except the health check and the provider webhook sits behind
/// the management API key.
pub fn router(state: AppState) -> Router {
    let management = Router::new()
        // Instance lifecycle
        .route("/api/wa/config", get(instance::config))
        .route("/api/wa/start", post(instance::start))
        .route("/api/wa/qr", get(instance::qr))
        .route("/api/wa/instance/status", get(instance::status))
        .route("/api/wa/set_webhook", post(instance::set_webhook))
        .route("/api/wa/test", post(instance::test_send))
        // Board
        .route("/api/wa/board", get(board::board))
        .route("/api/wa/messages", get(board::messages))
        .route("/api/wa/chat/meta", post(board::update_meta))
        .route("/api/wa/chat/bulk_move", post(board::bulk_move))
        // Admin
        .route("/api/wa/admin/password", post(admin::set_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(health::health))
        // Provider webhook
        .route("/api/wa/webhook", get(webhook::probe).post(webhook::receive))
        .merge(management)
        .with_state(state)
}
