//! Append-only message log.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{NewMessage, StoredMessage};

/// Append a message and return its ID.
pub async fn insert_message(pool: &SqlitePool, message: &NewMessage) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (tenant_id, instance, jid, from_me, text, ts, agent, raw_json)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.tenant_id)
    .bind(&message.instance)
    .bind(&message.jid)
    .bind(message.from_me)
    .bind(&message.text)
    .bind(message.ts)
    .bind(&message.agent)
    .bind(&message.raw_json)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Append a provider-timestamped message unless an identical one (same
/// conversation, direction, text and timestamp) is already stored.
///
/// Returns false for a redelivery. The check is a unique index, so
/// concurrent redeliveries insert exactly one row.
pub async fn insert_message_once(pool: &SqlitePool, message: &NewMessage) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (tenant_id, instance, jid, from_me, text, ts, agent, raw_json, dedup)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(message.tenant_id)
    .bind(&message.instance)
    .bind(&message.jid)
    .bind(message.from_me)
    .bind(&message.text)
    .bind(message.ts)
    .bind(&message.agent)
    .bind(&message.raw_json)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Messages for one conversation, oldest first by timestamp.
///
/// Only the latest `limit` messages are returned.
pub async fn list_conversation(
    pool: &SqlitePool,
    tenant_id: i64,
    jid: &str,
    limit: i64,
) -> Result<Vec<StoredMessage>> {
    let mut messages = sqlx::query_as::<_, StoredMessage>(
        r#"
        SELECT id, tenant_id, instance, jid, from_me, text, ts, agent, raw_json, created_at
        FROM messages
        WHERE tenant_id = ? AND jid = ?
        ORDER BY ts DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(tenant_id)
    .bind(jid)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    messages.reverse();
    Ok(messages)
}

/// All messages for a tenant in insertion order.
pub async fn list_for_tenant(pool: &SqlitePool, tenant_id: i64) -> Result<Vec<StoredMessage>> {
    let messages = sqlx::query_as::<_, StoredMessage>(
        r#"
        SELECT id, tenant_id, instance, jid, from_me, text, ts, agent, raw_json, created_at
        FROM messages
        WHERE tenant_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}
