//! Application state shared across handlers.

use std::sync::Arc;

use admin_commands::AdminInterpreter;
use board::BoardService;
use database::Database;
use orchestrator::Pipeline;
use provider_client::ProviderClient;

use crate::config::WebhookSettings;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub provider: ProviderClient,
    pub pipeline: Pipeline,
    pub board: BoardService,
    pub admin: AdminInterpreter,
    pub webhook: Arc<WebhookSettings>,
    /// Management API key; `None` leaves management routes open.
    pub api_key: Option<Arc<str>>,
}
