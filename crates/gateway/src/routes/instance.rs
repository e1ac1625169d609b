//! Provider instance lifecycle and test sends.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use database::{message, tenant, NewMessage};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use webhook_normalizer::{instance_name, normalize_jid, number_from_jid, tenant_from_instance};

use crate::error::{GatewayError, Result};
use crate::state::AppState;

const DEFAULT_TEST_TEXT: &str = "Hello from the API";

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    #[serde(alias = "brand_id")]
    pub tenant_id: i64,
}

/// Non-secret tenant config plus the instance and webhook it maps to.
pub async fn config(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Value>> {
    let tenant = tenant::get_tenant(state.db.pool(), query.tenant_id).await?;
    let datasources =
        database::datasource::list_datasources(state.db.pool(), tenant.id, false).await?;
    let instance = instance_name(tenant.id);

    Ok(Json(json!({
        "tenant": { "id": tenant.id, "name": tenant.name },
        "config": {
            "agent_mode": tenant.agent_mode,
            "model_name": tenant.model_name,
            "temperature": tenant.temperature,
            "rules_md": tenant.rules_md,
            "rules_json": tenant.rules_json,
            "admin_enabled": tenant.admin_enabled,
            "admin_keyword": tenant.admin_keyword,
            "admin_allow_list": tenant.allow_list(),
        },
        "datasources": datasources,
        "has_password": tenant.admin_password_hash.as_deref().is_some_and(|h| !h.is_empty()),
        "instance_name": instance,
        "webhook_example": state.webhook.url_for(&instance),
    })))
}

/// Create, register the webhook for, and connect the tenant's instance.
pub async fn start(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Value>> {
    let instance = instance_name(query.tenant_id);
    let webhook = state
        .webhook
        .url_for(&instance)
        .ok_or(GatewayError::NotConfigured("PUBLIC_BASE_URL"))?;

    let result = state.provider.ensure_started(&instance, Some(&webhook)).await;
    info!(tenant_id = query.tenant_id, ok = result.ok, "Instance start");

    if !result.ok {
        return Err(GatewayError::Provider {
            status: result.connect.status,
            body: result.connect.body.to_string(),
        });
    }

    Ok(Json(json!({
        "ok": true,
        "instance": instance,
        "result": result,
    })))
}

/// Connection state plus a QR image or pairing code when not connected.
pub async fn qr(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Json<Value> {
    let instance = instance_name(query.tenant_id);
    let result = state.provider.qr_or_pairing(&instance).await;
    Json(json!({
        "connected": result.connected,
        "qr": result.qr_image,
        "pairingCode": result.pairing_code,
        "raw": result.raw,
    }))
}

pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Json<Value> {
    let instance = instance_name(query.tenant_id);
    let st = state.provider.connection_state(&instance).await;
    Json(json!({
        "ok": true,
        "instance": instance,
        "connected": st.connected,
        "state": st.raw,
    }))
}

/// Register the webhook URL with the provider.
pub async fn set_webhook(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Value>> {
    let instance = instance_name(query.tenant_id);
    let webhook = state
        .webhook
        .url_for(&instance)
        .ok_or(GatewayError::NotConfigured("PUBLIC_BASE_URL"))?;

    let response = state.provider.set_webhook(&instance, &webhook).await;
    info!(tenant_id = query.tenant_id, status = response.status, "Set webhook");

    Ok(Json(json!({
        "ok": response.is_success(),
        "status": response.status,
        "body": response.body,
        "webhook_url": webhook,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct TestSendRequest {
    #[serde(default, alias = "brand_id")]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default, alias = "phone", alias = "number", alias = "jid")]
    pub to: String,
    #[serde(default, alias = "message", alias = "body")]
    pub text: Option<String>,
}

/// Send a text through the tenant's instance and store it as outbound so
/// the board shows it without waiting for the provider echo.
pub async fn test_send(
    State(state): State<AppState>,
    Json(req): Json<TestSendRequest>,
) -> Result<Json<Value>> {
    let tenant_id = req
        .tenant_id
        .or_else(|| req.instance.as_deref().and_then(tenant_from_instance))
        .filter(|id| *id > 0);
    let to = number_from_jid(&req.to);

    let (Some(tenant_id), false) = (tenant_id, to.is_empty()) else {
        return Err(GatewayError::BadRequest("tenant_id and to are required".into()));
    };

    let text = req
        .text
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_TEXT.to_string());
    let instance = instance_name(tenant_id);

    let result = state.provider.send_text(&instance, &to, &text).await;
    if !result.ok {
        return Err(GatewayError::Provider {
            status: result.response.status,
            body: result.response.body.to_string(),
        });
    }

    let record = NewMessage {
        tenant_id,
        instance: instance.clone(),
        jid: normalize_jid(&to).unwrap_or_default(),
        from_me: true,
        text: Some(text),
        ts: Utc::now().timestamp(),
        agent: None,
        raw_json: json!({ "source": "test_send" }).to_string(),
    };
    if let Err(e) = message::insert_message(state.db.pool(), &record).await {
        warn!(tenant_id, "Failed to store test message: {}", e);
    }

    Ok(Json(json!({ "ok": true, "result": result.response.body })))
}
