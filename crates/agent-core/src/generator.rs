//! Text generation capability.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::AgentError;
use crate::parsed::Parsed;

/// One generation call: a system role plus a user prompt and sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System prompt for the agent role.
    pub system_prompt: String,
    /// Fully composed user prompt (context, retrieval context and message).
    pub user_prompt: String,
    /// Tenant model override; `None` uses the generator default.
    pub model: Option<String>,
    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,
    /// Optional output bound.
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Create a request with the default temperature and no overrides.
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: None,
            temperature: 0.2,
            max_tokens: None,
        }
    }

    /// Set the model override.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model.filter(|m| !m.trim().is_empty());
        self
    }

    /// Set the sampling temperature, clamped to 0.0 - 1.0.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }
}

/// The black-box language-model capability.
///
/// Implementations must bound their own network time; the router adds an
/// outer timeout as well.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce reply text for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, AgentError>;

    /// Produce a JSON object for the request.
    ///
    /// Output that is not JSON is recovered as `{"text": ...}`.
    async fn generate_structured(
        &self,
        request: GenerationRequest,
    ) -> Result<Parsed<Value>, AgentError> {
        let text = self.generate(request).await?;
        Ok(parse_structured(&text))
    }

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Parse model output as JSON, tolerating a surrounding code fence.
pub fn parse_structured(text: &str) -> Parsed<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    Parsed::or_fallback(
        serde_json::from_str::<Value>(unfenced),
        json!({ "text": trimmed }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured() {
        let fenced = parse_structured("```json\n{\"title\": \"Promo\"}\n```");
        assert!(!fenced.recovered());
        assert_eq!(fenced.value()["title"], "Promo");

        let prose = parse_structured("Sorry, no JSON today");
        assert!(prose.recovered());
        assert_eq!(prose.value()["text"], "Sorry, no JSON today");
    }

    #[test]
    fn test_request_builders() {
        let request = GenerationRequest::new("sys", "user")
            .with_model(Some("  ".to_string()))
            .with_temperature(1.7);
        assert_eq!(request.model, None);
        assert_eq!(request.temperature, 1.0);

        let request = request.with_model(Some("gpt-4o".to_string()));
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
    }
}
