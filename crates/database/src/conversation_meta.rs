//! Per-conversation board metadata.
//!
//! Writes are plain upserts; callers serialize read-modify-write cycles per
//! (tenant, jid).

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ConversationMeta;

/// Get the metadata for one conversation, if any was stored.
pub async fn get_meta(
    pool: &SqlitePool,
    tenant_id: i64,
    jid: &str,
) -> Result<Option<ConversationMeta>> {
    let record = sqlx::query_as::<_, ConversationMeta>(
        r#"
        SELECT tenant_id, jid, title, color, column_name, priority, interest,
               pinned, archived, tags_json, notes, updated_at
        FROM conversation_meta
        WHERE tenant_id = ? AND jid = ?
        "#,
    )
    .bind(tenant_id)
    .bind(jid)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// All stored metadata for a tenant.
pub async fn list_meta(pool: &SqlitePool, tenant_id: i64) -> Result<Vec<ConversationMeta>> {
    let records = sqlx::query_as::<_, ConversationMeta>(
        r#"
        SELECT tenant_id, jid, title, color, column_name, priority, interest,
               pinned, archived, tags_json, notes, updated_at
        FROM conversation_meta
        WHERE tenant_id = ?
        ORDER BY jid ASC
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Create or replace the metadata row for `meta.tenant_id`/`meta.jid`.
pub async fn upsert_meta(pool: &SqlitePool, meta: &ConversationMeta) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO conversation_meta
            (tenant_id, jid, title, color, column_name, priority, interest,
             pinned, archived, tags_json, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(tenant_id, jid) DO UPDATE SET
            title = excluded.title,
            color = excluded.color,
            column_name = excluded.column_name,
            priority = excluded.priority,
            interest = excluded.interest,
            pinned = excluded.pinned,
            archived = excluded.archived,
            tags_json = excluded.tags_json,
            notes = excluded.notes,
            updated_at = datetime('now')
        "#,
    )
    .bind(meta.tenant_id)
    .bind(&meta.jid)
    .bind(&meta.title)
    .bind(&meta.color)
    .bind(&meta.column_name)
    .bind(meta.priority)
    .bind(meta.interest)
    .bind(meta.pinned)
    .bind(meta.archived)
    .bind(&meta.tags_json)
    .bind(&meta.notes)
    .execute(pool)
    .await?;

    Ok(())
}
