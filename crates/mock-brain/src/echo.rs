//! Echo generator - echoes the user prompt back.

use std::sync::Arc;

use agent_core::{async_trait, AgentError, GenerationRequest, TextGenerator};
use tokio::sync::Mutex;

/// A generator that echoes the user prompt and records every request.
///
/// Useful for asserting which agent was selected (via the system prompt)
/// and that no generation happened at all.
#[derive(Debug, Clone, Default)]
pub struct EchoGenerator {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl EchoGenerator {
    /// Create a new EchoGenerator with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoGenerator with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoGenerator;
    ///
    /// let generator = EchoGenerator::with_prefix("Echo: ");
    /// // Will respond with "Echo: <user prompt>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Number of generation calls so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// All requests received, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AgentError> {
        let reply = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, request.user_prompt),
            None => request.user_prompt.clone(),
        };
        self.requests.lock().await.push(request);
        Ok(reply)
    }

    fn name(&self) -> &str {
        "EchoGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let generator = EchoGenerator::new();
        let reply = generator
            .generate(GenerationRequest::new("sys", "Hello!"))
            .await
            .unwrap();
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_echo_with_prefix_records_requests() {
        let generator = EchoGenerator::with_prefix("Echo: ");
        let clone = generator.clone();

        let reply = generator
            .generate(GenerationRequest::new("sales", "precio?"))
            .await
            .unwrap();
        assert_eq!(reply, "Echo: precio?");

        let requests = clone.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system_prompt, "sales");
    }

    #[tokio::test]
    async fn test_generator_name() {
        assert_eq!(EchoGenerator::new().name(), "EchoGenerator");
    }
}
