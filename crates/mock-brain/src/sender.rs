//! Recording sender - captures outbound messages instead of delivering them.

use std::sync::Arc;

use agent_core::{async_trait, AgentError, MessageSender, SendReceipt};
use serde_json::json;
use tokio::sync::Mutex;

/// An outbound message captured by [`RecordingSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub instance: String,
    pub to_number: String,
    pub text: String,
}

/// A sender that records every send. Optionally every send fails.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    fail: bool,
}

impl RecordingSender {
    /// Create a sender whose sends succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender whose sends are recorded and then rejected.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// All messages sent so far.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(
        &self,
        instance: &str,
        to_number: &str,
        text: &str,
    ) -> Result<SendReceipt, AgentError> {
        self.sent.lock().await.push(SentMessage {
            instance: instance.to_string(),
            to_number: to_number.to_string(),
            text: text.to_string(),
        });

        if self.fail {
            return Err(AgentError::SendFailed {
                status: 500,
                body: "mock send failure".to_string(),
            });
        }

        Ok(SendReceipt {
            status: 200,
            raw: json!({ "mock": true }),
        })
    }
}
