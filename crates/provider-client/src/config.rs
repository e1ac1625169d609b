//! Configuration types for provider-client.

use std::time::Duration;

/// Default request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Ordered set of headers sent with one attempt.
pub type HeaderVariant = Vec<(&'static str, String)>;

/// Configuration for connecting to the provider HTTP API.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider (e.g., "http://localhost:8080").
    pub base_url: String,
    /// API key, sent under several header conventions.
    pub api_key: Option<String>,
    /// Integration type passed on instance creation.
    pub integration: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            integration: "WHATSAPP".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API key. Blank keys are ignored.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Set the integration type.
    pub fn with_integration(mut self, integration: impl Into<String>) -> Self {
        let integration = integration.into();
        if !integration.trim().is_empty() {
            self.integration = integration.trim().to_string();
        }
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for a provider path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Auth header variants in the order they are tried.
    ///
    /// With a key: `X-API-KEY`, then `Authorization: Bearer`, then `apikey`.
    /// Without a key a single unauthenticated variant is used.
    pub fn header_variants(&self) -> Vec<HeaderVariant> {
        let base = ("Content-Type", "application/json".to_string());
        match &self.api_key {
            Some(key) => vec![
                vec![base.clone(), ("X-API-KEY", key.clone())],
                vec![base.clone(), ("Authorization", format!("Bearer {}", key))],
                vec![base, ("apikey", key.clone())],
            ],
            None => vec![vec![base]],
        }
    }
}
