//! Tenant context assembled for agent prompts.

use agent_core::{Parsed, RetrievalSource};
use database::{Datasource, Tenant};
use serde_json::Value;

/// Brand context, markdown rules and JSON rules, in that order.
///
/// JSON rules are pretty-printed when they parse and included raw otherwise.
pub fn tenant_context(tenant: &Tenant) -> String {
    let mut parts = Vec::new();

    if !tenant.context.trim().is_empty() {
        parts.push(format!("Brand context:\n{}\n", tenant.context.trim()));
    }

    if let Some(md) = tenant.rules_md.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(format!("Business rules (MD):\n{}\n", md.trim()));
    }

    if let Some(raw) = tenant.rules_json.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(render_rules_json(raw));
    }

    parts.join("\n")
}

fn render_rules_json(raw: &str) -> String {
    let parsed = Parsed::or_fallback(serde_json::from_str::<Value>(raw), Value::Null);
    match parsed {
        Parsed::Value(value) => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string());
            format!("Rules (JSON):\n{pretty}")
        }
        Parsed::Recovered { .. } => format!("Rules (JSON - raw):\n{raw}"),
    }
}

/// Enabled datasources as retrieval sources.
pub fn retrieval_sources(datasources: &[Datasource]) -> Vec<RetrievalSource> {
    datasources
        .iter()
        .filter(|ds| ds.enabled)
        .map(|ds| RetrievalSource {
            name: ds.name.clone(),
            kind: ds.kind.clone(),
            url: ds.url.clone(),
            headers_json: ds.headers_json.clone(),
        })
        .collect()
}
