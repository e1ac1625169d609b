//! Provider HTTP client with endpoint and auth-header probing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::candidates;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::qr;
use crate::types::{
    Candidate, ConnectionState, Operation, ProviderResponse, QrResult, SendResult, StartResult,
};

/// Client for an Evolution-style provider whose HTTP surface varies by build.
///
/// Every call is a fresh request. The only shared state is a best-effort
/// hint of which candidate last worked per operation; it can be dropped at
/// any time without changing results.
#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    config: ProviderConfig,
    hints: Arc<Mutex<HashMap<Operation, usize>>>,
}

impl ProviderClient {
    /// Create a client. No request is made.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.base_url.is_empty() {
            return Err(ProviderError::Config("provider base URL is empty".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Http)?;

        if config.api_key.is_none() {
            warn!("Provider API key not configured; sending unauthenticated requests");
        }

        Ok(Self {
            http,
            config,
            hints: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Forget all cached candidate hints.
    pub fn clear_hints(&self) {
        if let Ok(mut hints) = self.hints.lock() {
            hints.clear();
        }
    }

    /// Send one candidate, retrying with the next header variant on 401/403.
    async fn execute(&self, candidate: &Candidate) -> ProviderResponse {
        let url = self.config.url(&candidate.path);
        let mut last = ProviderResponse::network_error("no header variants");

        for headers in self.config.header_variants() {
            let mut request = self.http.request(candidate.method.clone(), &url);
            for (name, value) in &headers {
                request = request.header(*name, value);
            }
            if !candidate.query.is_empty() {
                request = request.query(&candidate.query);
            }
            if let Some(body) = &candidate.body {
                request = request.json(body);
            }

            debug!("HTTP {} {}", candidate.method, url);

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    let result = ProviderResponse::from_text(status, &text);
                    debug!("HTTP {} {} -> {}", candidate.method, url, status);

                    if !result.is_auth_error() {
                        return result;
                    }
                    last = result;
                }
                Err(e) => {
                    warn!("HTTP error {} {}: {}", candidate.method, candidate.path, e);
                    last = ProviderResponse::network_error(e.to_string());
                }
            }
        }

        last
    }

    fn attempt_order(&self, operation: Operation, len: usize) -> Vec<usize> {
        let hint = self
            .hints
            .lock()
            .ok()
            .and_then(|hints| hints.get(&operation).copied())
            .filter(|idx| *idx < len);

        match hint {
            Some(first) => std::iter::once(first)
                .chain((0..len).filter(|idx| *idx != first))
                .collect(),
            None => (0..len).collect(),
        }
    }

    fn remember(&self, operation: Operation, idx: usize) {
        if let Ok(mut hints) = self.hints.lock() {
            hints.insert(operation, idx);
        }
    }

    /// Try candidates in order; return the first accepted response or the last one.
    async fn probe(&self, operation: Operation, candidates: &[Candidate]) -> ProviderResponse {
        let mut last = ProviderResponse::network_error("no endpoint candidates");

        for idx in self.attempt_order(operation, candidates.len()) {
            let candidate = &candidates[idx];
            let response = self.execute(candidate).await;

            if response.is_accepted() {
                self.remember(operation, idx);
                return response;
            }

            debug!(
                "{:?} candidate {} {} rejected with {}",
                operation, candidate.method, candidate.path, response.status
            );
            last = response;
        }

        warn!(
            "{:?}: all {} candidates exhausted, last status {}",
            operation,
            candidates.len(),
            last.status
        );
        last
    }

    /// Create an instance.
    pub async fn create_instance(&self, name: &str, webhook: Option<&str>) -> ProviderResponse {
        let candidates = candidates::create_instance(name, webhook, &self.config.integration);
        self.probe(Operation::CreateInstance, &candidates).await
    }

    /// Register the webhook URL, falling back to re-creating the instance with it.
    pub async fn set_webhook(&self, name: &str, url: &str) -> ProviderResponse {
        let response = self
            .probe(Operation::SetWebhook, &candidates::set_webhook(name, url))
            .await;
        if response.is_success() {
            return response;
        }

        let created = self.create_instance(name, Some(url)).await;
        if created.is_success() {
            created
        } else {
            response
        }
    }

    /// Start (or resume) the pairing flow.
    pub async fn connect_instance(&self, name: &str) -> ProviderResponse {
        self.probe(Operation::Connect, &candidates::connect(name)).await
    }

    /// Normalized connection state.
    pub async fn connection_state(&self, name: &str) -> ConnectionState {
        let raw = self
            .probe(Operation::ConnectionState, &candidates::connection_state(name))
            .await;
        let connected = raw.is_success() && qr::is_connected(&raw.body);
        ConnectionState { connected, raw }
    }

    /// Create if absent, register the webhook, then connect.
    ///
    /// Fails only when both create and connect fail; a webhook failure is
    /// recorded but not fatal.
    pub async fn ensure_started(&self, name: &str, webhook: Option<&str>) -> StartResult {
        info!("Ensuring instance {} is started", name);

        let create = self.create_instance(name, webhook).await;
        if !create.is_success() {
            warn!("create_instance {} -> {}", name, create.status);
        }

        let webhook = match webhook {
            Some(url) => {
                let response = self.set_webhook(name, url).await;
                if !response.is_success() {
                    warn!("set_webhook {} -> {}", name, response.status);
                }
                Some(response)
            }
            None => None,
        };

        let connect = self.connect_instance(name).await;
        let ok = create.is_success() || connect.is_success();

        StartResult {
            ok,
            create,
            webhook,
            connect,
        }
    }

    /// QR image and/or pairing code for a disconnected instance.
    pub async fn qr_or_pairing(&self, name: &str) -> QrResult {
        let state = self.connection_state(name).await;
        if state.connected {
            return QrResult {
                connected: true,
                qr_image: None,
                pairing_code: None,
                raw: state.raw.body,
            };
        }

        let connect = self.connect_instance(name).await;
        let mut raw = connect.body.clone();
        let mut pairing_code = None;
        let mut qr_image = None;

        if connect.is_success() {
            pairing_code = qr::pairing_code(&connect.body);
            qr_image = qr::embedded_image(&connect.body)
                .or_else(|| qr::link_code(&connect.body).and_then(|c| qr::render_data_url(&c)));
        }

        if qr_image.is_none() {
            let fetched = self.probe(Operation::Qr, &candidates::qr(name)).await;
            if fetched.is_success() {
                qr_image = qr::embedded_image(&fetched.body);
                let fetched_code = qr::pairing_code(&fetched.body);
                // Keep the connect payload unless the fallback carried QR data.
                if qr_image.is_some() || fetched_code.is_some() {
                    raw = fetched.body;
                }
                pairing_code = pairing_code.or(fetched_code);
            }
        }

        QrResult {
            connected: false,
            qr_image,
            pairing_code,
            raw,
        }
    }

    /// Send a text message. `to_number` is digits only.
    pub async fn send_text(&self, name: &str, to_number: &str, text: &str) -> SendResult {
        let response = self
            .probe(
                Operation::SendText,
                &candidates::send_text(name, to_number, text),
            )
            .await;

        if response.is_success() {
            debug!("Sent text via {} to {}", name, to_number);
        } else {
            warn!(
                "send_text via {} to {} failed with {}",
                name, to_number, response.status
            );
        }

        SendResult {
            ok: response.is_success(),
            response,
        }
    }

    /// Index of the candidate that last worked for an operation.
    pub fn hint(&self, operation: Operation) -> Option<usize> {
        self.hints
            .lock()
            .ok()
            .and_then(|hints| hints.get(&operation).copied())
    }
}

/// Digits of a number or JID (everything before `@`).
pub fn number_from_jid(jid: &str) -> String {
    let local = jid.split('@').next().unwrap_or_default();
    local.chars().filter(char::is_ascii_digit).collect()
}
