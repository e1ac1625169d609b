//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tenant (brand) and its admin-mutable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Numeric tenant ID. The provider instance is named `brand_{id}`.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-text brand context fed to the agents.
    pub context: String,
    /// Default agent mode (`ventas`, `reservas` or `auto`).
    pub agent_mode: String,
    /// Optional model override.
    pub model_name: Option<String>,
    /// Sampling temperature (0..=1).
    pub temperature: f64,
    /// Markdown rules.
    pub rules_md: Option<String>,
    /// Structured rules, stored verbatim (may not be valid JSON).
    pub rules_json: Option<String>,
    /// Whether inline admin commands are accepted.
    pub admin_enabled: bool,
    /// Trigger keyword for admin commands.
    pub admin_keyword: String,
    /// Bcrypt digest of the admin password.
    #[serde(skip_serializing)]
    pub admin_password_hash: Option<String>,
    /// JSON array of privileged sender numbers.
    pub admin_allow_list: String,
}

impl Tenant {
    /// Privileged sender numbers; a malformed column reads as empty.
    pub fn allow_list(&self) -> Vec<String> {
        serde_json::from_str::<Vec<String>>(&self.admin_allow_list).unwrap_or_default()
    }
}

/// A tenant about to be created.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTenant {
    pub name: String,
    pub context: String,
    pub agent_mode: String,
    pub admin_enabled: bool,
    pub admin_keyword: String,
    pub admin_allow_list: Vec<String>,
}

/// Fields the admin command interpreter may change on a tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantConfigUpdate {
    pub agent_mode: String,
    pub model_name: Option<String>,
    pub temperature: f64,
    pub rules_md: Option<String>,
    pub rules_json: Option<String>,
}

impl From<&Tenant> for TenantConfigUpdate {
    fn from(tenant: &Tenant) -> Self {
        Self {
            agent_mode: tenant.agent_mode.clone(),
            model_name: tenant.model_name.clone(),
            temperature: tenant.temperature,
            rules_md: tenant.rules_md.clone(),
            rules_json: tenant.rules_json.clone(),
        }
    }
}

/// A message as persisted in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoredMessage {
    /// Auto-incrementing ID (insertion order).
    pub id: i64,
    pub tenant_id: i64,
    /// Provider instance that carried the message.
    pub instance: String,
    /// Canonical conversation identifier (`digits@s.whatsapp.net`).
    pub jid: String,
    /// True when the message originated from the tenant side.
    pub from_me: bool,
    /// Text body; `None` for non-text payloads.
    pub text: Option<String>,
    /// Unix timestamp in seconds.
    pub ts: i64,
    /// Agent that produced an outbound reply.
    pub agent: Option<String>,
    /// Original payload, kept for audit.
    pub raw_json: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A message about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub tenant_id: i64,
    pub instance: String,
    pub jid: String,
    pub from_me: bool,
    pub text: Option<String>,
    pub ts: i64,
    pub agent: Option<String>,
    pub raw_json: String,
}

/// A retrieval datasource owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Datasource {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    /// `postgres` or `http`.
    pub kind: String,
    /// Connection string or URL.
    pub url: String,
    /// Optional JSON object of request headers.
    pub headers_json: Option<String>,
    pub enabled: bool,
    pub read_only: bool,
}

/// Board metadata for one conversation. At most one row per (tenant, jid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConversationMeta {
    pub tenant_id: i64,
    pub jid: String,
    /// Title override.
    pub title: Option<String>,
    /// Color tag.
    pub color: Option<String>,
    /// Board column.
    pub column_name: String,
    /// Priority 0..=3.
    pub priority: i64,
    /// Interest 0..=3.
    pub interest: i64,
    pub pinned: bool,
    pub archived: bool,
    /// JSON array of tags.
    pub tags_json: String,
    pub notes: Option<String>,
    /// Last update timestamp.
    pub updated_at: String,
}

impl ConversationMeta {
    /// Default metadata for a conversation that has none stored.
    pub fn new(tenant_id: i64, jid: impl Into<String>) -> Self {
        Self {
            tenant_id,
            jid: jid.into(),
            title: None,
            color: None,
            column_name: "inbox".to_string(),
            priority: 0,
            interest: 0,
            pinned: false,
            archived: false,
            tags_json: "[]".to_string(),
            notes: None,
            updated_at: String::new(),
        }
    }

    /// Tags as a list; a malformed column reads as empty.
    pub fn tags(&self) -> Vec<String> {
        serde_json::from_str::<Vec<String>>(&self.tags_json).unwrap_or_default()
    }
}
