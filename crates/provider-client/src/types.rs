//! Request candidates and normalized provider results.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};

/// Status used for network-level failures (no HTTP response at all).
pub const NETWORK_ERROR_STATUS: u16 = 599;

/// Longest non-JSON body kept in a response.
const RAW_BODY_LIMIT: usize = 2000;

/// Logical provider operations that are resolved by probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateInstance,
    SetWebhook,
    Connect,
    ConnectionState,
    Qr,
    SendText,
}

/// One known shape of a provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(&'static str, String)>,
}

impl Candidate {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

/// Status and body of one provider attempt.
///
/// This is also the structured failure value: exhausted probes and network
/// errors are reported through it instead of an error type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Value,
}

impl ProviderResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Build a response from raw response text; non-JSON text is wrapped.
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| {
            let raw: String = text.chars().take(RAW_BODY_LIMIT).collect();
            json!({ "raw": raw })
        });
        Self { status, body }
    }

    /// A failure with no HTTP response.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            status: NETWORK_ERROR_STATUS,
            body: json!({ "error": message.into() }),
        }
    }

    /// 2xx or 3xx.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// The request was rejected for its credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// The candidate worked and probing can stop.
    ///
    /// Builds reject unknown body shapes with 400/415/422 and unknown paths
    /// with 404/405, so every non-2xx/3xx status moves on to the next
    /// candidate.
    pub fn is_accepted(&self) -> bool {
        self.is_success()
    }
}

/// Normalized connection state of an instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionState {
    pub connected: bool,
    pub raw: ProviderResponse,
}

/// QR image and/or pairing code for linking a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrResult {
    pub connected: bool,
    /// Data URL of a scannable QR image.
    pub qr_image: Option<String>,
    /// Short textual link code.
    pub pairing_code: Option<String>,
    pub raw: Value,
}

/// Outcome of an outbound text message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendResult {
    pub ok: bool,
    pub response: ProviderResponse,
}

/// Outcome of [`ensure_started`](crate::ProviderClient::ensure_started).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartResult {
    pub ok: bool,
    pub create: ProviderResponse,
    /// `None` when no webhook URL was given.
    pub webhook: Option<ProviderResponse>,
    pub connect: ProviderResponse,
}
