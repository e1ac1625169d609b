//! Error types for provider-client.

use thiserror::Error;

/// Errors raised while building the provider client.
///
/// Request-level failures are never raised; they come back as a
/// [`ProviderResponse`](crate::ProviderResponse) with an HTTP-like status.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP client construction failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
