//! Retrieval context from tenant datasources.

use std::time::Duration;

use agent_core::{async_trait, ContextBuilder, RetrievalSource};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::OrchestratorError;

/// Sources consulted per message.
pub const MAX_SOURCES: usize = 4;
/// Characters kept from each HTTP body.
pub const MAX_BODY_CHARS: usize = 2000;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches `http` datasources with a GET and reports other kinds by name.
#[derive(Debug, Clone)]
pub struct HttpContextBuilder {
    client: reqwest::Client,
}

impl HttpContextBuilder {
    pub fn new() -> Result<Self, OrchestratorError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, OrchestratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    async fn fetch(&self, source: &RetrievalSource) -> Result<String, String> {
        let response = self
            .client
            .get(&source.url)
            .headers(parse_headers(source.headers_json.as_deref()))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let response = response.error_for_status().map_err(|e| e.to_string())?;
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(body.chars().take(MAX_BODY_CHARS).collect())
    }
}

/// Header map from a JSON object of strings. Anything else is ignored.
fn parse_headers(headers_json: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(raw) = headers_json.filter(|s| !s.trim().is_empty()) else {
        return headers;
    };

    let map: Map<String, Value> = match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            debug!("Ignoring datasource headers: {}", e);
            return headers;
        }
    };

    for (key, value) in map {
        let Some(value) = value.as_str() else { continue };
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

#[async_trait]
impl ContextBuilder for HttpContextBuilder {
    async fn build_context(&self, sources: &[RetrievalSource], query: &str) -> String {
        let mut pieces = Vec::new();
        debug!(sources = sources.len(), query_len = query.len(), "Building retrieval context");

        for source in sources.iter().take(MAX_SOURCES) {
            match source.kind.as_str() {
                "http" => match self.fetch(source).await {
                    Ok(body) => pieces.push(format!("Source: {} (HTTP)\n{}", source.name, body)),
                    Err(e) => {
                        warn!("Datasource {} fetch failed: {}", source.name, e);
                        pieces.push(format!("Source: {} (HTTP) -> error: {}", source.name, e));
                    }
                },
                "postgres" => pieces.push(format!(
                    "Source: {} (Postgres) -> not queried",
                    source.name
                )),
                other => pieces.push(format!(
                    "Source: {} ({}) -> unsupported kind",
                    source.name, other
                )),
            }
        }

        pieces.join("\n\n")
    }
}
