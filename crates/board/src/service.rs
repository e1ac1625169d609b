//! Board queries and metadata edits against the store.

use database::{conversation_meta, message, ConversationMeta, Database};
use tracing::{debug, info};
use webhook_normalizer::normalize_jid;

use crate::aggregate::build_board;
use crate::error::{BoardError, Result};
use crate::meta::{normalize_column, MetaLocks, MetaPatch};
use crate::model::{BoardColumn, BoardQuery};

/// Board view and metadata editing for all tenants.
#[derive(Debug, Clone)]
pub struct BoardService {
    db: Database,
    locks: MetaLocks,
}

impl BoardService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            locks: MetaLocks::new(),
        }
    }

    /// Build the board from the current message log and metadata.
    pub async fn build(&self, tenant_id: i64, query: &BoardQuery) -> Result<Vec<BoardColumn>> {
        let messages = message::list_for_tenant(self.db.pool(), tenant_id).await?;
        let metas = conversation_meta::list_meta(self.db.pool(), tenant_id).await?;
        let columns = build_board(&messages, &metas, query);
        debug!(
            tenant_id,
            group = %query.group_by,
            columns = columns.len(),
            "Built board"
        );
        Ok(columns)
    }

    /// Apply a patch to one conversation and return the stored result.
    pub async fn update_meta(
        &self,
        tenant_id: i64,
        jid: &str,
        patch: &MetaPatch,
    ) -> Result<ConversationMeta> {
        let jid = normalize_jid(jid).ok_or_else(|| BoardError::InvalidJid(jid.to_string()))?;
        let _guard = self.locks.lock(tenant_id, &jid).await;

        let mut meta = conversation_meta::get_meta(self.db.pool(), tenant_id, &jid)
            .await?
            .unwrap_or_else(|| ConversationMeta::new(tenant_id, jid.clone()));
        patch.apply(&mut meta);
        conversation_meta::upsert_meta(self.db.pool(), &meta).await?;

        let stored = conversation_meta::get_meta(self.db.pool(), tenant_id, &jid)
            .await?
            .unwrap_or(meta);
        debug!(tenant_id, jid = %jid, "Updated conversation meta");
        Ok(stored)
    }

    /// Move conversations to a column. Invalid jids are skipped; returns
    /// the number moved.
    pub async fn bulk_move(&self, tenant_id: i64, jids: &[String], column: &str) -> Result<usize> {
        let column = normalize_column(column);
        let patch = MetaPatch {
            column: Some(column.clone()),
            ..Default::default()
        };

        let mut moved = 0;
        for raw in jids {
            if normalize_jid(raw).is_none() {
                continue;
            }
            self.update_meta(tenant_id, raw, &patch).await?;
            moved += 1;
        }

        info!(tenant_id, moved, column = %column, "Bulk move");
        Ok(moved)
    }
}
