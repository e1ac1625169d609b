//! Error types for agent collaborators.

use thiserror::Error;

/// Errors raised by generators, context builders, senders and verifiers.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network-level failure talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// The generation capability failed or returned unusable output.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The operation exceeded its time bound.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Outbound delivery was rejected by the provider.
    #[error("send failed (status {status}): {body}")]
    SendFailed { status: u16, body: String },

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
