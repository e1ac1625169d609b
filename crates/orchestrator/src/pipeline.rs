//! Per-delivery webhook pipeline.
//!
//! ```text
//! webhook payload
//!      ↓ normalize (tenant, messages in order)
//!      ↓ for each message:
//!          persist (de-duplicated on provider timestamp)
//!          tenant echo?  → stop (never answer our own replies)
//!          no text?      → stop
//!          admin gate    → reply with admin result, stop
//!          route         → agent reply (or fallback), persist, send
//! ```
//!
//! A failure on one message is recorded in the report and the rest of the
//! delivery is still processed.

use admin_commands::AdminInterpreter;
use database::{message, tenant, Database, DatabaseError, NewMessage};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use webhook_normalizer::{instance_name, normalize, NormalizedMessage};

use crate::error::OrchestratorError;
use crate::router::{deliver, ConversationRouter};

/// Agent label stored on admin replies.
pub const ADMIN_AGENT: &str = "admin";

/// Reply sent when admin handling itself failed.
const ADMIN_ERROR_REPLY: &str = "Admin command failed. Please try again later.";

/// Outcome for one message of a delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Tenant-side echo, stored for audit only.
    Echo { stored: bool },
    /// No text to act on, stored for audit only.
    NoText { stored: bool },
    /// Handled by the admin gate.
    Admin { delivered: bool },
    /// Answered by an agent.
    Replied {
        agent: String,
        fallback: bool,
        delivered: bool,
    },
    /// Processing this message failed.
    Failed { error: String },
}

/// Summary of one webhook delivery.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeliveryReport {
    pub tenant_id: Option<i64>,
    /// Candidates the normalizer could not use.
    pub dropped: usize,
    pub results: Vec<MessageOutcome>,
}

impl DeliveryReport {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    /// Number of agent or admin replies attempted.
    pub fn replies(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, MessageOutcome::Admin { .. } | MessageOutcome::Replied { .. }))
            .count()
    }
}

/// Ingests a delivery and answers every routable message.
#[derive(Clone)]
pub struct Pipeline {
    db: Database,
    admin: AdminInterpreter,
    router: ConversationRouter,
}

impl Pipeline {
    pub fn new(db: Database, admin: AdminInterpreter, router: ConversationRouter) -> Self {
        Self { db, admin, router }
    }

    pub fn router(&self) -> &ConversationRouter {
        &self.router
    }

    /// Process one webhook payload. `instance_hint` is the `instance` query
    /// parameter, if any.
    pub async fn process(&self, instance_hint: Option<&str>, payload: &Value) -> DeliveryReport {
        let batch = normalize(instance_hint, payload);
        let mut report = DeliveryReport {
            tenant_id: batch.tenant_id,
            dropped: batch.dropped,
            results: Vec::with_capacity(batch.messages.len()),
        };

        let Some(tenant_id) = batch.tenant_id else {
            warn!("Webhook delivery without a resolvable tenant");
            return report;
        };

        // An unreadable tenant still gets fallback replies, without the admin gate.
        let admin_gate = match tenant::get_tenant(self.db.pool(), tenant_id).await {
            Ok(_) => true,
            Err(DatabaseError::NotFound { .. }) => {
                warn!(tenant_id, "Webhook delivery for unknown tenant");
                report.tenant_id = None;
                return report;
            }
            Err(e) => {
                error!(tenant_id, "Failed to load tenant: {}", e);
                false
            }
        };

        info!(
            tenant_id,
            messages = batch.messages.len(),
            dropped = batch.dropped,
            "Processing webhook delivery"
        );

        for msg in &batch.messages {
            let outcome = match self.process_message(tenant_id, msg, admin_gate).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(tenant_id, jid = %msg.jid, "Message processing failed: {}", e);
                    MessageOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.results.push(outcome);
        }

        report
    }

    async fn process_message(
        &self,
        tenant_id: i64,
        msg: &NormalizedMessage,
        admin_gate: bool,
    ) -> Result<MessageOutcome, OrchestratorError> {
        let stored = match self.ingest(tenant_id, msg).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(tenant_id, jid = %msg.jid, "Failed to store inbound message: {}", e);
                false
            }
        };

        if msg.from_me {
            debug!(tenant_id, jid = %msg.jid, "Skipping tenant-side echo");
            return Ok(MessageOutcome::Echo { stored });
        }

        let text = match msg.text.as_deref() {
            Some(text) if msg.is_routable() => text,
            _ => return Ok(MessageOutcome::NoText { stored }),
        };

        let admin_reply = if admin_gate {
            match self.admin.try_handle(tenant_id, &msg.number, text).await {
                Ok(outcome) if outcome.handled => Some(outcome.reply),
                Ok(_) => None,
                Err(e) => {
                    error!(tenant_id, "Admin handling failed: {}", e);
                    Some(ADMIN_ERROR_REPLY.to_string())
                }
            }
        } else {
            None
        };

        if let Some(reply) = admin_reply {
            let instance = instance_name(tenant_id);
            self.router
                .persist_reply(tenant_id, &instance, &msg.jid, &reply, ADMIN_AGENT)
                .await;
            let delivered = deliver(self.router.sender(), &instance, &msg.number, &reply).await;
            return Ok(MessageOutcome::Admin { delivered });
        }

        let routed = self.router.route(tenant_id, &msg.jid, text).await?;
        Ok(MessageOutcome::Replied {
            agent: routed.agent.as_str().to_string(),
            fallback: routed.fallback,
            delivered: routed.delivered,
        })
    }

    /// Append a message to the log. Returns false when a record with the
    /// same provider timestamp already exists.
    async fn ingest(&self, tenant_id: i64, msg: &NormalizedMessage) -> Result<bool, OrchestratorError> {
        let record = NewMessage {
            tenant_id,
            instance: instance_name(tenant_id),
            jid: msg.jid.clone(),
            from_me: msg.from_me,
            text: msg.text.clone(),
            ts: msg.ts,
            agent: None,
            raw_json: Value::Object(msg.raw.clone()).to_string(),
        };

        if !msg.provider_ts {
            message::insert_message(self.db.pool(), &record).await?;
            return Ok(true);
        }

        let stored = message::insert_message_once(self.db.pool(), &record).await?;
        if !stored {
            debug!(tenant_id, jid = %msg.jid, ts = msg.ts, "Duplicate message not stored");
        }
        Ok(stored)
    }
}
