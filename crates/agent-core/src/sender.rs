//! Outbound delivery trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;

/// Provider acknowledgement for a delivered message.
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    /// HTTP-like status reported by the provider.
    pub status: u16,
    /// Raw provider response, kept for diagnostics.
    pub raw: Value,
}

/// Trait for delivering text to a provider instance.
///
/// Abstracted to support the real provider client and test doubles.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `to_number` through the named provider instance.
    ///
    /// # Arguments
    /// * `instance` - Provider instance name (one per tenant)
    /// * `to_number` - Digits-only destination number
    /// * `text` - Message content
    async fn send_text(
        &self,
        instance: &str,
        to_number: &str,
        text: &str,
    ) -> Result<SendReceipt, AgentError>;
}
