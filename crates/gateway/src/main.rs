//! HTTP gateway for the multi-tenant WhatsApp agents.
//!
//! Receives provider webhooks, answers through the sales/reservations
//! agents, and exposes instance lifecycle, board and admin endpoints.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use admin_commands::AdminInterpreter;
use agent_core::BcryptVerifier;
use board::BoardService;
use database::Database;
use openai_brain::OpenAiGenerator;
use orchestrator::{ConversationRouter, HttpContextBuilder, Pipeline, ProviderSender};
use provider_client::ProviderClient;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, provider = %config.provider.base_url, "Starting gateway");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let provider = ProviderClient::new(config.provider.clone())?;
    let generator = OpenAiGenerator::from_env()?;

    let conversation = ConversationRouter::new(
        db.clone(),
        Arc::new(generator),
        Arc::new(HttpContextBuilder::new()?),
        Arc::new(ProviderSender::new(provider.clone())),
    )
    .with_generation_timeout(config.generation_timeout);

    let admin = AdminInterpreter::new(
        db.clone(),
        Arc::new(BcryptVerifier::default()),
        config.admin.clone(),
    );

    let state = AppState {
        db: db.clone(),
        provider,
        pipeline: Pipeline::new(db.clone(), admin.clone(), conversation),
        board: BoardService::new(db),
        admin,
        webhook: Arc::new(config.webhook.clone()),
        api_key: config.api_key.as_deref().map(Arc::from),
    };
    if state.api_key.is_none() {
        warn!("GATEWAY_API_KEY not set; management routes are open and password setup is disabled");
    }

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    info!(addr = %config.addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
