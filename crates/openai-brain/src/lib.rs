//! OpenAI-backed text generation.
//!
//! This crate provides [`OpenAiGenerator`], an implementation of
//! [`agent_core::TextGenerator`] over the chat-completions API. It is the
//! production collaborator behind the sales and reservations agents.
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_brain::{GenerationRequest, OpenAiGenerator, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = OpenAiGenerator::from_env()?;
//!     let reply = generator
//!         .generate(GenerationRequest::new("You are a sales agent.", "precio?"))
//!         .await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod generator;

pub use config::{OpenAiConfig, OpenAiConfigBuilder};
pub use generator::OpenAiGenerator;

// Re-export agent-core types for convenience
pub use agent_core::{async_trait, AgentError, GenerationRequest, TextGenerator};
