//! Board, conversation history and metadata edits.

use axum::extract::{Query, State};
use axum::Json;
use board::{BoardQuery, GroupBy, MetaPatch, DEFAULT_LIMIT};
use database::message;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use webhook_normalizer::{instance_name, normalize_jid};

use crate::error::{GatewayError, Result};
use crate::state::AppState;

const DEFAULT_MESSAGES: i64 = 60;
const MAX_MESSAGES: i64 = 300;

#[derive(Debug, Deserialize)]
pub struct BoardParams {
    #[serde(alias = "brand_id")]
    pub tenant_id: i64,
    pub group: Option<String>,
    #[serde(default)]
    pub show_archived: bool,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// Grouped conversations plus the instance connection flag.
pub async fn board(
    State(state): State<AppState>,
    Query(params): Query<BoardParams>,
) -> Result<Json<Value>> {
    let group_by = match params.group.as_deref() {
        Some(group) => group.parse::<GroupBy>()?,
        None => GroupBy::default(),
    };
    let query = BoardQuery {
        group_by,
        include_archived: params.show_archived,
        search: params.q.filter(|q| !q.trim().is_empty()),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 5000),
    };

    let columns = state.board.build(params.tenant_id, &query).await?;

    let st = state
        .provider
        .connection_state(&instance_name(params.tenant_id))
        .await;
    if !st.raw.is_success() {
        warn!(tenant_id = params.tenant_id, status = st.raw.status, "Board connection check failed");
    }

    Ok(Json(json!({
        "ok": true,
        "connected": st.connected,
        "group": group_by,
        "columns": columns,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MessagesParams {
    #[serde(alias = "brand_id")]
    pub tenant_id: i64,
    pub jid: String,
    pub limit: Option<i64>,
}

/// Newest messages of one conversation, oldest first.
pub async fn messages(
    State(state): State<AppState>,
    Query(params): Query<MessagesParams>,
) -> Result<Json<Value>> {
    let Some(jid) = normalize_jid(&params.jid) else {
        return Ok(Json(json!({ "ok": true, "messages": [] })));
    };
    let limit = params.limit.unwrap_or(DEFAULT_MESSAGES).clamp(1, MAX_MESSAGES);

    let rows = message::list_conversation(state.db.pool(), params.tenant_id, &jid, limit).await?;
    let messages: Vec<Value> = rows
        .into_iter()
        .map(|m| {
            json!({
                "key": { "remoteJid": jid, "fromMe": m.from_me },
                "message": { "conversation": m.text.unwrap_or_default() },
                "ts": m.ts,
                "agent": m.agent,
            })
        })
        .collect();

    Ok(Json(json!({ "ok": true, "messages": messages })))
}

#[derive(Debug, Deserialize)]
pub struct MetaRequest {
    #[serde(alias = "brand_id")]
    pub tenant_id: i64,
    pub jid: String,
    #[serde(flatten)]
    pub patch: MetaPatch,
}

pub async fn update_meta(
    State(state): State<AppState>,
    Json(req): Json<MetaRequest>,
) -> Result<Json<Value>> {
    let meta = state
        .board
        .update_meta(req.tenant_id, &req.jid, &req.patch)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "meta": {
            "jid": meta.jid,
            "title": meta.title,
            "color": meta.color,
            "column": meta.column_name,
            "priority": meta.priority,
            "interest": meta.interest,
            "pinned": meta.pinned,
            "archived": meta.archived,
            "tags": meta.tags(),
            "notes": meta.notes,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct BulkMoveRequest {
    #[serde(alias = "brand_id")]
    pub tenant_id: i64,
    pub jids: Vec<String>,
    pub column: String,
}

pub async fn bulk_move(
    State(state): State<AppState>,
    Json(req): Json<BulkMoveRequest>,
) -> Result<Json<Value>> {
    if req.jids.is_empty() {
        return Err(GatewayError::BadRequest("jids must not be empty".into()));
    }
    let updated = state
        .board
        .bulk_move(req.tenant_id, &req.jids, &req.column)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "updated": updated,
        "column": board::normalize_column(&req.column),
    })))
}
