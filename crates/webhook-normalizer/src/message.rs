//! Canonical message produced by normalization.

use serde::Serialize;
use serde_json::{Map, Value};

/// Opaque original payload, retained for audit.
pub type RawPayload = Map<String, Value>;

/// One message extracted from a webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMessage {
    /// Canonical conversation identifier (`digits@s.whatsapp.net`).
    pub jid: String,
    /// Digits-only sender number, used as the reply address.
    pub number: String,
    /// True when the tenant side sent it (an echo of our own reply).
    pub from_me: bool,
    /// Text body; `None` for stickers, reactions and other non-text payloads.
    pub text: Option<String>,
    /// Unix seconds; ingestion time when the payload carried none.
    pub ts: i64,
    /// Whether `ts` came from the payload.
    pub provider_ts: bool,
    pub raw: RawPayload,
}

impl NormalizedMessage {
    /// Eligible for admin handling and agent routing.
    ///
    /// Tenant-side messages are never routable; replying to them would loop.
    pub fn is_routable(&self) -> bool {
        !self.from_me && self.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Result of normalizing one webhook delivery.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizedBatch {
    /// Resolved tenant; `None` means the delivery is acknowledged and ignored.
    pub tenant_id: Option<i64>,
    /// Messages in delivery order.
    pub messages: Vec<NormalizedMessage>,
    /// Candidates dropped for lack of a conversation identifier or content.
    pub dropped: usize,
}
