//! Mock collaborators for gateway message processing.
//!
//! This crate provides test doubles for the `agent-core` traits:
//! - `EchoGenerator` - Echoes the user prompt and records every request
//! - `FailingGenerator` - Always fails, to exercise fallback replies
//! - `DelayedGenerator` - Wraps another generator with artificial delay
//! - `RecordingSender` - Records outbound sends, optionally failing them
//! - `StaticContext` - Returns a fixed retrieval context
//!
//! For production generation, use the `openai-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{EchoGenerator, GenerationRequest, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::AgentError> {
//!     let generator = EchoGenerator::new();
//!
//!     let reply = generator
//!         .generate(GenerationRequest::new("system", "Hello!"))
//!         .await?;
//!     assert_eq!(reply, "Hello!");
//!     assert_eq!(generator.call_count().await, 1);
//!     Ok(())
//! }
//! ```

mod context;
mod delayed;
mod echo;
mod failing;
mod sender;

// Re-export agent-core types for convenience
pub use agent_core::{
    async_trait, AgentError, ContextBuilder, GenerationRequest, MessageSender, SendReceipt,
    TextGenerator,
};

pub use context::StaticContext;
pub use delayed::DelayedGenerator;
pub use echo::EchoGenerator;
pub use failing::FailingGenerator;
pub use sender::{RecordingSender, SentMessage};
