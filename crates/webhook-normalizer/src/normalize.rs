//! Best-effort extraction over ordered field candidates.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::jid::{normalize_jid, number_from_jid, tenant_from_instance};
use crate::message::{NormalizedBatch, NormalizedMessage, RawPayload};

const INSTANCE_KEYS: [&str; 3] = ["instance", "instanceName", "session"];
const WRAPPER_KEYS: [&str; 6] = ["messages", "data", "items", "entry", "events", "list"];
const TEXT_KEYS: [&str; 3] = ["text", "body", "messageText"];
const CAPTION_KEYS: [&str; 3] = ["imageMessage", "videoMessage", "documentMessage"];
const TIMESTAMP_KEYS: [&str; 3] = ["timestamp", "messageTimestamp", "ts"];

/// Above this a timestamp is taken to be in milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Follow a path of object keys.
fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |cur, key| cur.get(*key))
}

/// First non-blank string among the candidate paths.
fn first_str<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|path| at(value, path).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Normalize a webhook delivery using the current time for missing timestamps.
pub fn normalize(instance_hint: Option<&str>, payload: &Value) -> NormalizedBatch {
    normalize_at(instance_hint, payload, Utc::now().timestamp())
}

/// Normalize a webhook delivery; `now` (unix seconds) replaces missing timestamps.
pub fn normalize_at(instance_hint: Option<&str>, payload: &Value, now: i64) -> NormalizedBatch {
    let Some(tenant_id) = resolve_tenant(instance_hint, payload) else {
        debug!("Webhook without a resolvable tenant; ignoring");
        return NormalizedBatch::default();
    };

    let candidates = pick_candidates(payload);
    let total = candidates.len();
    let messages: Vec<_> = candidates
        .into_iter()
        .filter_map(|candidate| normalize_one(candidate, now))
        .collect();

    NormalizedBatch {
        tenant_id: Some(tenant_id),
        dropped: total - messages.len(),
        messages,
    }
}

/// Tenant from the query hint, else an instance field at the top level or
/// inside a `data`/`body` wrapper.
pub fn resolve_tenant(instance_hint: Option<&str>, payload: &Value) -> Option<i64> {
    if let Some(id) = instance_hint.and_then(tenant_from_instance) {
        return Some(id);
    }

    [Some(payload), payload.get("data"), payload.get("body")]
        .into_iter()
        .flatten()
        .flat_map(|scope| INSTANCE_KEYS.iter().filter_map(move |k| scope.get(*k)))
        .filter_map(Value::as_str)
        .find_map(tenant_from_instance)
}

fn objects(items: &[Value]) -> Vec<&RawPayload> {
    items.iter().filter_map(Value::as_object).collect()
}

/// Candidate message objects, in delivery order.
fn pick_candidates(payload: &Value) -> Vec<&RawPayload> {
    match payload {
        Value::Array(items) => objects(items),
        Value::Object(map) => {
            let wrapped = WRAPPER_KEYS
                .iter()
                .filter_map(|k| map.get(*k).and_then(Value::as_array))
                .find(|items| !items.is_empty());
            if let Some(items) = wrapped {
                return objects(items);
            }
            match map.get("data").and_then(Value::as_object) {
                Some(data) => vec![data],
                None => vec![map],
            }
        }
        _ => Vec::new(),
    }
}

fn normalize_one(candidate: &RawPayload, now: i64) -> Option<NormalizedMessage> {
    let value = Value::Object(candidate.clone());

    let Some(jid) = extract_jid(&value) else {
        debug!("Dropping webhook candidate without a conversation identifier");
        return None;
    };

    let text = extract_text(&value);
    if text.is_none() && !has_non_text_signal(&value) {
        debug!("Dropping empty webhook candidate for {}", jid);
        return None;
    }

    let provider_ts = extract_timestamp(&value);

    Some(NormalizedMessage {
        number: number_from_jid(&jid),
        jid,
        from_me: extract_from_me(&value),
        text,
        ts: provider_ts.unwrap_or(now),
        provider_ts: provider_ts.is_some(),
        raw: candidate.clone(),
    })
}

fn extract_jid(value: &Value) -> Option<String> {
    first_str(
        value,
        &[
            &["from"],
            &["sender"],
            &["key", "remoteJid"],
            &["message", "key", "remoteJid"],
            &["remoteJid"],
        ],
    )
    .and_then(normalize_jid)
}

fn extract_from_me(value: &Value) -> bool {
    let paths: [&[&str]; 2] = [&["fromMe"], &["key", "fromMe"]];
    let explicit = paths
        .iter()
        .find_map(|path| at(value, path).and_then(Value::as_bool));
    if let Some(flag) = explicit {
        return flag;
    }
    ["isMe", "me", "own"]
        .iter()
        .any(|k| value.get(*k).and_then(Value::as_bool).unwrap_or(false))
}

/// Plain fields, then `message.conversation`, then extended text, then
/// media captions. First non-empty wins.
fn extract_text(value: &Value) -> Option<String> {
    let plain: Vec<&[&str]> = TEXT_KEYS.iter().map(std::slice::from_ref).collect();
    if let Some(text) = first_str(value, &plain) {
        return Some(text.to_string());
    }

    let mut nested: Vec<Vec<&str>> = vec![
        vec!["message", "conversation"],
        vec!["message", "extendedTextMessage", "text"],
    ];
    nested.extend(CAPTION_KEYS.iter().map(|k| vec!["message", *k, "caption"]));
    let nested: Vec<&[&str]> = nested.iter().map(Vec::as_slice).collect();

    first_str(value, &nested).map(String::from)
}

fn has_non_text_signal(value: &Value) -> bool {
    let has_message = value
        .get("message")
        .and_then(Value::as_object)
        .is_some_and(|m| !m.is_empty());
    has_message || value.get("messageType").is_some()
}

/// Provider timestamp in seconds. Accepts numbers, numeric strings and
/// `{ "low": n }` long encodings; millisecond values are scaled down.
fn extract_timestamp(value: &Value) -> Option<i64> {
    TIMESTAMP_KEYS
        .iter()
        .filter_map(|k| value.get(*k))
        .find_map(timestamp_value)
        .map(|ts| if ts > MILLIS_THRESHOLD { ts / 1000 } else { ts })
}

fn timestamp_value(value: &Value) -> Option<i64> {
    let ts = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Object(_) => value.get("low").and_then(timestamp_value),
        _ => None,
    }?;
    (ts > 0).then_some(ts)
}
