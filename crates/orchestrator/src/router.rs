//! Conversation router: pick an agent, generate, persist and send the reply.

use std::sync::Arc;
use std::time::Duration;

use agent_core::{
    annotate_reply, compose_user_prompt, system_prompt, Agent, AgentMode, ContextBuilder,
    GenerationRequest, MessageSender, TextGenerator,
};
use chrono::Utc;
use database::{datasource, message, tenant, Database, DatabaseError, NewMessage, Tenant};
use serde_json::json;
use tracing::{debug, error, info, warn};
use webhook_normalizer::{instance_name, normalize_jid, number_from_jid};

use crate::context::{retrieval_sources, tenant_context};
use crate::error::OrchestratorError;

/// Default bound on a single generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Reply sent when generation fails or times out.
pub const FALLBACK_REPLY: &str =
    "Thanks for your message! We received it and will get back to you shortly.";

/// Terms that send an `auto` tenant's message to the reservations agent.
const RESERVATION_TERMS: &[&str] = &["reserv", "turno", "hora", "agenda", "disponibilidad"];

/// Terms that send an `auto` tenant's message to the sales agent.
const SALES_TERMS: &[&str] = &[
    "precio", "costo", "promo", "comprar", "venta", "stock", "cotiza",
];

/// Agent for a message under a tenant mode.
///
/// `auto` checks scheduling terms first, then commerce terms, and defaults
/// to sales.
pub fn select_agent(mode: AgentMode, text: &str) -> Agent {
    match mode {
        AgentMode::Sales => Agent::Sales,
        AgentMode::Reservations => Agent::Reservations,
        AgentMode::Auto => {
            let lower = text.to_lowercase();
            if RESERVATION_TERMS.iter().any(|t| lower.contains(t)) {
                return Agent::Reservations;
            }
            if !SALES_TERMS.iter().any(|t| lower.contains(t)) {
                debug!("No routing terms matched, defaulting to sales");
            }
            Agent::Sales
        }
    }
}

/// What happened to one routed message.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub agent: Agent,
    pub reply: String,
    /// The fallback acknowledgement was used instead of a generated reply.
    pub fallback: bool,
    /// The provider accepted the send.
    pub delivered: bool,
}

/// Routes inbound text to the tenant's agent and delivers the reply.
#[derive(Clone)]
pub struct ConversationRouter {
    db: Database,
    generator: Arc<dyn TextGenerator>,
    context: Arc<dyn ContextBuilder>,
    sender: Arc<dyn MessageSender>,
    generation_timeout: Duration,
}

impl ConversationRouter {
    pub fn new(
        db: Database,
        generator: Arc<dyn TextGenerator>,
        context: Arc<dyn ContextBuilder>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            db,
            generator,
            context,
            sender,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Route `text` from `sender` (a number or JID) for a tenant.
    ///
    /// Only an unknown tenant is an error. If the tenant cannot be read for
    /// any other reason the sender still gets the fallback reply.
    pub async fn route(
        &self,
        tenant_id: i64,
        sender: &str,
        text: &str,
    ) -> Result<RouteOutcome, OrchestratorError> {
        match tenant::get_tenant(self.db.pool(), tenant_id).await {
            Ok(tenant) => Ok(self.route_for(&tenant, sender, text).await),
            Err(e @ DatabaseError::NotFound { .. }) => Err(e.into()),
            Err(e) => {
                error!(tenant_id, "Failed to load tenant, replying with fallback: {}", e);
                let reply = FALLBACK_REPLY.to_string();
                Ok(self.finish(tenant_id, sender, Agent::Sales, reply, true).await)
            }
        }
    }

    /// Route with an already loaded tenant.
    pub async fn route_for(&self, tenant: &Tenant, sender: &str, text: &str) -> RouteOutcome {
        let mode = AgentMode::parse(&tenant.agent_mode).unwrap_or_default();
        let agent = select_agent(mode, text);
        debug!(tenant_id = tenant.id, %mode, %agent, "Agent selected");

        let sources = match datasource::list_datasources(self.db.pool(), tenant.id, true).await {
            Ok(sources) => sources,
            Err(e) => {
                warn!(tenant_id = tenant.id, "Datasources unavailable, no retrieval context: {}", e);
                Vec::new()
            }
        };
        let rag_context = self
            .context
            .build_context(&retrieval_sources(&sources), text)
            .await;

        let request = GenerationRequest::new(
            system_prompt(agent),
            compose_user_prompt(agent, text, &tenant_context(tenant), &rag_context),
        )
        .with_model(tenant.model_name.clone())
        .with_temperature(tenant.temperature as f32);

        let (reply, fallback) = match self.generate(request).await {
            Some(generated) => (annotate_reply(agent, text, generated.trim()), false),
            None => (FALLBACK_REPLY.to_string(), true),
        };

        self.finish(tenant.id, sender, agent, reply, fallback).await
    }

    /// Persist the reply, then send it.
    async fn finish(
        &self,
        tenant_id: i64,
        sender: &str,
        agent: Agent,
        reply: String,
        fallback: bool,
    ) -> RouteOutcome {
        let number = number_from_jid(sender);
        let jid = normalize_jid(sender).unwrap_or_else(|| sender.to_string());
        let instance = instance_name(tenant_id);

        self.persist_reply(tenant_id, &instance, &jid, &reply, agent.as_str())
            .await;

        let delivered = deliver(self.sender.as_ref(), &instance, &number, &reply).await;
        info!(
            tenant_id,
            jid = %jid,
            %agent,
            fallback,
            delivered,
            "Routed message"
        );

        RouteOutcome {
            agent,
            reply,
            fallback,
            delivered,
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Option<String> {
        match tokio::time::timeout(self.generation_timeout, self.generator.generate(request)).await
        {
            Ok(Ok(reply)) if !reply.trim().is_empty() => Some(reply),
            Ok(Ok(_)) => {
                warn!("{} returned an empty reply", self.generator.name());
                None
            }
            Ok(Err(e)) => {
                warn!("{} failed: {}", self.generator.name(), e);
                None
            }
            Err(_) => {
                warn!(
                    "{} timed out after {:?}",
                    self.generator.name(),
                    self.generation_timeout
                );
                None
            }
        }
    }

    /// Persist an outbound reply. A failed write is logged; the reply is
    /// still delivered.
    pub(crate) async fn persist_reply(
        &self,
        tenant_id: i64,
        instance: &str,
        jid: &str,
        reply: &str,
        agent: &str,
    ) {
        let record = NewMessage {
            tenant_id,
            instance: instance.to_string(),
            jid: jid.to_string(),
            from_me: true,
            text: Some(reply.to_string()),
            ts: Utc::now().timestamp(),
            agent: Some(agent.to_string()),
            raw_json: json!({ "out": true, "text": reply }).to_string(),
        };
        if let Err(e) = message::insert_message(self.db.pool(), &record).await {
            error!(tenant_id, jid = %jid, "Failed to persist outbound reply: {}", e);
        }
    }

    pub(crate) fn sender(&self) -> &dyn MessageSender {
        self.sender.as_ref()
    }
}

/// Send and log; returns whether the provider accepted it.
pub(crate) async fn deliver(
    sender: &dyn MessageSender,
    instance: &str,
    number: &str,
    text: &str,
) -> bool {
    match sender.send_text(instance, number, text).await {
        Ok(receipt) => {
            debug!("Delivered to {} via {} ({})", number, instance, receipt.status);
            true
        }
        Err(e) => {
            warn!("Failed to deliver to {} via {}: {}", number, instance, e);
            false
        }
    }
}
