//! Delayed generator - wraps another generator with artificial delay.

use std::time::Duration;

use agent_core::{async_trait, AgentError, GenerationRequest, TextGenerator};
use tokio::time::sleep;

/// A generator that wraps another generator and adds artificial delay.
///
/// Useful for testing timeout handling and simulating model latency.
pub struct DelayedGenerator<G: TextGenerator> {
    inner: G,
    delay: Duration,
}

impl<G: TextGenerator> DelayedGenerator<G> {
    /// Create a new DelayedGenerator wrapping `inner` with the specified delay.
    pub fn new(inner: G, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a generator with a delay in milliseconds.
    pub fn with_millis(inner: G, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for DelayedGenerator<G> {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AgentError> {
        sleep(self.delay).await;
        self.inner.generate(request).await
    }

    fn name(&self) -> &str {
        "DelayedGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EchoGenerator;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_generator() {
        let generator = DelayedGenerator::with_millis(EchoGenerator::new(), 100);

        let start = Instant::now();
        let reply = generator
            .generate(GenerationRequest::new("sys", "test"))
            .await
            .unwrap();

        assert_eq!(reply, "test");
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
