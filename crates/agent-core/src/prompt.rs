//! Agent prompts, prompt composition and reply annotations.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::agent::Agent;

/// System role for the sales agent.
pub const SALES_SYSTEM_PROMPT: &str = "You are a SALES agent (SDR) for a local business. \
Your job: (1) qualify the lead, (2) identify the need or pain point, \
(3) propose a next step (demo, call, quote) and (4) answer clearly. \
Always reply in the customer's language, concise, in Markdown.";

/// System role for the reservations agent.
pub const RESERVATIONS_SYSTEM_PROMPT: &str = "You are a RESERVATIONS agent for a local business. \
Goal: (1) understand the request, (2) ask for missing details, \
(3) propose valid dates and times, (4) confirm next steps. \
Reply in the customer's language, brief, in Markdown.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}\s*)?(?:\(?\d{2,4}\)?[\s\-.]?)?\d{3,4}[\s\-.]?\d{3,4}")
        .expect("valid phone regex")
});

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2})").expect("valid datetime regex")
});

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// System prompt for an agent.
pub fn system_prompt(agent: Agent) -> &'static str {
    match agent {
        Agent::Sales => SALES_SYSTEM_PROMPT,
        Agent::Reservations => RESERVATIONS_SYSTEM_PROMPT,
    }
}

/// Compose the user prompt: tenant context, retrieval context, then the message
/// and the agent's output outline.
pub fn compose_user_prompt(agent: Agent, text: &str, context: &str, rag_context: &str) -> String {
    let mut parts = Vec::new();
    if !context.trim().is_empty() {
        parts.push(context.trim().to_string());
    }
    if !rag_context.trim().is_empty() {
        let label = match agent {
            Agent::Sales => "Knowledge",
            Agent::Reservations => "Availability / rules",
        };
        parts.push(format!("{}:\n{}", label, rag_context.trim()));
    }

    let mut prompt = parts.join("\n\n");
    if !prompt.is_empty() {
        prompt.push_str("\n\n");
    }

    match agent {
        Agent::Sales => {
            prompt.push_str("Lead message (sales):\n");
            prompt.push_str(text);
            prompt.push_str(
                "\n\nReply to the lead directly in 3-5 lines. Qualify interest, \
                 address likely objections and close with one concrete next step.",
            );
        }
        Agent::Reservations => {
            prompt.push_str("Customer request (reservations):\n");
            prompt.push_str(text);
            prompt.push_str(
                "\n\nReply to the customer directly. Ask for any missing details, \
                 offer two concrete date/time options and state the next action.",
            );
        }
    }

    prompt
}

/// Append the agent's detected-data note to a generated reply.
///
/// The sales agent reports email/phone found in the user text; the
/// reservations agent reports an ISO date-time found in it.
pub fn annotate_reply(agent: Agent, user_text: &str, reply: &str) -> String {
    match agent {
        Agent::Sales => {
            let mut found = Vec::new();
            if let Some(m) = EMAIL_RE.find(user_text) {
                found.push(format!("email: {}", m.as_str()));
            }
            if let Some(m) = PHONE_RE.find(user_text) {
                found.push(format!("phone: {}", m.as_str()));
            }
            if found.is_empty() {
                reply.to_string()
            } else {
                format!("{}\n\n> Detected: {}", reply, found.join(", "))
            }
        }
        Agent::Reservations => match extract_iso_datetime(user_text) {
            Some(iso) => format!("{}\n\n> Note: detected date/time **{}** (approx. UTC).", reply, iso),
            None => reply.to_string(),
        },
    }
}

fn extract_iso_datetime(text: &str) -> Option<String> {
    let caps = DATETIME_RE.captures(text)?;
    let raw = format!("{} {}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M")
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:00Z").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_prompt_stable() {
        let first = hash_prompt("test prompt");
        let second = hash_prompt("test prompt");
        let different = hash_prompt("another prompt");

        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[test]
    fn test_hash_prompt_is_lower_hex_sha256() {
        let digest = hash_prompt("");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_prompt("test prompt").len(), 64);
    }

    #[test]
    fn test_compose_orders_context_before_message() {
        let prompt = compose_user_prompt(Agent::Sales, "precio?", "Brand context", "stock: 3");
        let ctx = prompt.find("Brand context").unwrap();
        let rag = prompt.find("Knowledge:\nstock: 3").unwrap();
        let msg = prompt.find("precio?").unwrap();
        assert!(ctx < rag && rag < msg);
    }

    #[test]
    fn test_compose_without_context() {
        let prompt = compose_user_prompt(Agent::Reservations, "turno mañana", "", "  ");
        assert!(prompt.starts_with("Customer request (reservations):\nturno mañana"));
    }

    #[test]
    fn test_annotate_sales_contact() {
        let out = annotate_reply(Agent::Sales, "write me at ana@example.com", "Sure!");
        assert!(out.starts_with("Sure!"));
        assert!(out.contains("email: ana@example.com"));

        let plain = annotate_reply(Agent::Sales, "hi", "Sure!");
        assert_eq!(plain, "Sure!");
    }

    #[test]
    fn test_annotate_reservation_datetime() {
        let out = annotate_reply(Agent::Reservations, "turno 2025-03-14 10:30", "Ok");
        assert!(out.contains("2025-03-14T10:30:00Z"));

        let invalid = annotate_reply(Agent::Reservations, "turno 2025-13-40 99:99", "Ok");
        assert_eq!(invalid, "Ok");
    }
}
