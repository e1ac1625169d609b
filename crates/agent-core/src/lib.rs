//! Core traits and types for the gateway agents.
//!
//! This crate provides the shared interface between the pipeline and its
//! external collaborators:
//!
//! - [`TextGenerator`] - the black-box language-model capability
//! - [`ContextBuilder`] - retrieval context over tenant datasources
//! - [`MessageSender`] - outbound delivery to the provider
//! - [`PasswordVerifier`] - admin password hashing and verification
//! - [`AgentMode`] / [`Agent`] - which conversational agent answers
//! - [`Parsed`] - explicit "parsed or recovered" outcome for lenient parsing
//!
//! # Example
//!
//! ```rust
//! use agent_core::{async_trait, AgentError, GenerationRequest, TextGenerator};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl TextGenerator for Canned {
//!     async fn generate(&self, _request: GenerationRequest) -> Result<String, AgentError> {
//!         Ok("Hola!".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Canned"
//!     }
//! }
//! ```

mod agent;
mod context;
mod error;
mod generator;
mod parsed;
mod password;
mod prompt;
mod sender;

pub use agent::{Agent, AgentMode};
pub use context::{ContextBuilder, RetrievalSource};
pub use error::AgentError;
pub use generator::{parse_structured, GenerationRequest, TextGenerator};
pub use parsed::Parsed;
pub use password::{BcryptVerifier, PasswordVerifier};
pub use prompt::{
    annotate_reply, compose_user_prompt, hash_prompt, system_prompt, RESERVATIONS_SYSTEM_PROMPT,
    SALES_SYSTEM_PROMPT,
};
pub use sender::{MessageSender, SendReceipt};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
