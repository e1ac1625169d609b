//! Retrieval context collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tenant datasource as seen by the context builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalSource {
    /// Display name.
    pub name: String,
    /// Source kind (`postgres` or `http`).
    pub kind: String,
    /// Connection string or URL.
    pub url: String,
    /// Optional JSON object of request headers (http sources).
    pub headers_json: Option<String>,
}

/// Builds a retrieval-context string for a query over tenant datasources.
///
/// Failures are folded into the returned text; the pipeline never aborts
/// because a datasource is unreachable.
#[async_trait]
pub trait ContextBuilder: Send + Sync {
    /// Build context for `query` from the enabled `sources`.
    async fn build_context(&self, sources: &[RetrievalSource], query: &str) -> String;
}
