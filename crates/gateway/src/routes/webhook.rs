//! Provider webhook.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{GatewayError, Result};
use crate::state::AppState;

const TOKEN_HEADER: &str = "x-webhook-token";

#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(default)]
    pub token: String,
    pub instance: Option<String>,
}

/// Liveness probe some providers send before registering a webhook.
pub async fn probe() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Accept one delivery. The token may come from the query or the
/// `X-Webhook-Token` header.
pub async fn receive(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let expected = state.webhook.token.as_str();
    if !expected.is_empty() {
        let header = headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if query.token != expected && header != expected {
            warn!("Webhook rejected: invalid token");
            return Err(GatewayError::Unauthorized);
        }
    }

    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Webhook body is not JSON: {}", e);
        json!({})
    });

    let report = state
        .pipeline
        .process(query.instance.as_deref(), &payload)
        .await;

    if report.tenant_id.is_none() {
        return Ok(Json(json!({ "ok": true, "ignored": true })));
    }

    info!(
        tenant_id = report.tenant_id,
        processed = report.processed(),
        replies = report.replies(),
        "Webhook processed"
    );

    Ok(Json(json!({
        "ok": true,
        "tenant_id": report.tenant_id,
        "processed": report.processed(),
        "dropped": report.dropped,
        "results": report.results,
    })))
}
