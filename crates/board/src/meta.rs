//! Conversation metadata edits, serialized per (tenant, jid).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use database::ConversationMeta;
use serde::Deserialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Partial update of a conversation's board metadata. `None` leaves a
/// field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetaPatch {
    pub title: Option<String>,
    pub color: Option<String>,
    pub column: Option<String>,
    pub priority: Option<i64>,
    pub interest: Option<i64>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Lower-cased, trimmed column; blank means `inbox`.
pub fn normalize_column(column: &str) -> String {
    let column = column.trim().to_lowercase();
    if column.is_empty() {
        "inbox".to_string()
    } else {
        column
    }
}

/// Trimmed, de-duplicated and sorted tags.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut clean: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    clean.sort();
    clean.dedup();
    clean
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl MetaPatch {
    /// Apply this patch to `meta` with normalization.
    pub fn apply(&self, meta: &mut ConversationMeta) {
        if let Some(title) = &self.title {
            meta.title = non_blank(title);
        }
        if let Some(color) = &self.color {
            meta.color = non_blank(color);
        }
        if let Some(column) = &self.column {
            meta.column_name = normalize_column(column);
        }
        if let Some(priority) = self.priority {
            meta.priority = priority.clamp(0, 3);
        }
        if let Some(interest) = self.interest {
            meta.interest = interest.clamp(0, 3);
        }
        if let Some(pinned) = self.pinned {
            meta.pinned = pinned;
        }
        if let Some(archived) = self.archived {
            meta.archived = archived;
        }
        if let Some(tags) = &self.tags {
            meta.tags_json = serde_json::to_string(&normalize_tags(tags))
                .unwrap_or_else(|_| "[]".to_string());
        }
        if let Some(notes) = &self.notes {
            meta.notes = Some(notes.clone());
        }
    }
}

type LockKey = (i64, String);
type LockMap = HashMap<LockKey, Arc<AsyncMutex<()>>>;

/// One async lock per (tenant, jid). Different conversations never contend.
///
/// An entry lives only while someone holds or waits for it.
#[derive(Debug, Clone, Default)]
pub struct MetaLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl MetaLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one conversation's metadata.
    pub async fn lock(&self, tenant_id: i64, jid: &str) -> MetaGuard {
        let key = (tenant_id, jid.to_string());
        let entry = self
            .map()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let guard = entry.clone().lock_owned().await;
        MetaGuard {
            guard: Some(guard),
            entry,
            key,
            locks: Arc::clone(&self.locks),
        }
    }

    /// Conversations currently locked or waited on.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held lock on one conversation. Dropping it releases the lock and prunes
/// the entry when nobody else is waiting.
#[derive(Debug)]
pub struct MetaGuard {
    guard: Option<OwnedMutexGuard<()>>,
    entry: Arc<AsyncMutex<()>>,
    key: LockKey,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for MetaGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Map plus this guard: no other holder or waiter.
        if Arc::strong_count(&self.entry) == 2 {
            locks.remove(&self.key);
        }
    }
}
