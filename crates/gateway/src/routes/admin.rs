//! Admin password setup.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{GatewayError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(alias = "brand_id")]
    pub tenant_id: i64,
    pub password: String,
}

/// Hash and store a tenant's admin password.
///
/// Refused outright unless a management API key is configured.
pub async fn set_password(
    State(state): State<AppState>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<Value>> {
    if state.api_key.is_none() {
        return Err(GatewayError::NotConfigured("GATEWAY_API_KEY"));
    }
    database::tenant::get_tenant(state.db.pool(), req.tenant_id).await?;
    state.admin.set_password(req.tenant_id, &req.password).await?;
    Ok(Json(json!({ "ok": true })))
}
