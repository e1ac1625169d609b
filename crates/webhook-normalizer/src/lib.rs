//! Webhook payload normalization.
//!
//! Providers deliver the same logical event in many shapes: a bare message,
//! a batch under `messages`/`data`/`items`, Baileys-style nested `key` and
//! `message` objects, timestamps as seconds, milliseconds, strings or
//! protobuf longs. [`normalize`] turns one delivery into zero or more
//! [`NormalizedMessage`] values without failing:
//!
//! - no resolvable tenant: empty batch (the delivery is acknowledged)
//! - no conversation identifier: the candidate is dropped
//! - no text: kept for audit when another content signal exists, never routed
//! - no timestamp: ingestion time
//!
//! ```
//! use serde_json::json;
//! use webhook_normalizer::normalize;
//!
//! let payload = json!({
//!     "instance": "brand_1",
//!     "data": {
//!         "key": { "remoteJid": "5493511234567@s.whatsapp.net", "fromMe": false },
//!         "message": { "conversation": "hola" }
//!     }
//! });
//!
//! let batch = normalize(None, &payload);
//! assert_eq!(batch.tenant_id, Some(1));
//! assert!(batch.messages[0].is_routable());
//! ```

pub mod jid;
mod message;
mod normalize;

pub use jid::{instance_name, normalize_jid, number_from_jid, tenant_from_instance, JID_SUFFIX};
pub use message::{NormalizedBatch, NormalizedMessage, RawPayload};
pub use normalize::{normalize, normalize_at, resolve_tenant};
