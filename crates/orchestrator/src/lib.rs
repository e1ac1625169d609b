//! Webhook pipeline and conversation routing for the WhatsApp gateway.
//!
//! This crate provides the [`Pipeline`] type which turns one provider
//! webhook delivery into stored messages and replies:
//!
//! - Normalizes the payload and resolves the tenant
//! - Persists every message (tenant echoes included) for audit
//! - Gives admin commands priority over agent routing
//! - Routes the rest through the [`ConversationRouter`], which picks the
//!   sales or reservations agent, builds tenant and retrieval context,
//!   generates with a bounded timeout and falls back to a fixed
//!   acknowledgement on failure
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{ConversationRouter, HttpContextBuilder, Pipeline, ProviderSender};
//!
//! let router = ConversationRouter::new(
//!     db.clone(),
//!     Arc::new(generator),
//!     Arc::new(HttpContextBuilder::new()?),
//!     Arc::new(ProviderSender::new(provider)),
//! );
//! let pipeline = Pipeline::new(db, admin, router);
//! let report = pipeline.process(Some("brand_1"), &payload).await;
//! ```

mod context;
mod error;
mod pipeline;
mod retrieval;
mod router;
mod sender;

pub use context::{retrieval_sources, tenant_context};
pub use error::OrchestratorError;
pub use pipeline::{DeliveryReport, MessageOutcome, Pipeline, ADMIN_AGENT};
pub use retrieval::{HttpContextBuilder, MAX_BODY_CHARS, MAX_SOURCES};
pub use router::{
    select_agent, ConversationRouter, RouteOutcome, DEFAULT_GENERATION_TIMEOUT, FALLBACK_REPLY,
};
pub use sender::ProviderSender;
