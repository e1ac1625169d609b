//! Static context builder - returns a fixed string.

use agent_core::{async_trait, ContextBuilder, RetrievalSource};

/// A context builder that ignores its sources and returns fixed text.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    text: String,
}

impl StaticContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// A builder that always returns an empty context.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextBuilder for StaticContext {
    async fn build_context(&self, _sources: &[RetrievalSource], _query: &str) -> String {
        self.text.clone()
    }
}
