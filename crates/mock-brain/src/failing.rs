//! Failing generator - always returns an error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_core::{async_trait, AgentError, GenerationRequest, TextGenerator};

/// A generator that always fails with `GenerationFailed`.
#[derive(Debug, Clone, Default)]
pub struct FailingGenerator {
    calls: Arc<AtomicUsize>,
}

impl FailingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of generation attempts so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AgentError::GenerationFailed("mock failure".to_string()))
    }

    fn name(&self) -> &str {
        "FailingGenerator"
    }
}
