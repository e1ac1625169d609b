//! Provider-backed message sender.

use agent_core::{async_trait, AgentError, MessageSender, SendReceipt};
use provider_client::ProviderClient;

/// Delivers replies through the provider client.
///
/// A non-2xx/3xx provider answer is reported as `SendFailed`.
#[derive(Clone)]
pub struct ProviderSender {
    client: ProviderClient,
}

impl ProviderSender {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ProviderClient {
        &self.client
    }
}

#[async_trait]
impl MessageSender for ProviderSender {
    async fn send_text(
        &self,
        instance: &str,
        to_number: &str,
        text: &str,
    ) -> Result<SendReceipt, AgentError> {
        let result = self.client.send_text(instance, to_number, text).await;
        if result.ok {
            Ok(SendReceipt {
                status: result.response.status,
                raw: result.response.body,
            })
        } else {
            Err(AgentError::SendFailed {
                status: result.response.status,
                body: result.response.body.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_client::ProviderConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_maps_provider_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/brand_1"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"key": "m1"})))
            .mount(&server)
            .await;

        let sender = ProviderSender::new(ProviderClient::new(ProviderConfig::new(server.uri())).unwrap());
        let receipt = sender.send_text("brand_1", "549351", "hola").await.unwrap();
        assert_eq!(receipt.status, 201);
        assert_eq!(receipt.raw["key"], "m1");
    }

    #[tokio::test]
    async fn test_rejected_send_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "bad number"})))
            .mount(&server)
            .await;

        let sender = ProviderSender::new(ProviderClient::new(ProviderConfig::new(server.uri())).unwrap());
        let err = sender.send_text("brand_1", "0", "hola").await.unwrap_err();
        assert!(matches!(err, AgentError::SendFailed { status: 400, .. }));
    }
}
