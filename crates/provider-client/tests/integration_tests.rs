//! Integration tests for provider-client against a mock provider.
//!
//! Run:
//!   cargo test -p provider-client --test integration_tests

use std::time::Duration;

use provider_client::{Operation, ProviderClient, ProviderConfig, NETWORK_ERROR_STATUS};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ProviderClient {
    ProviderClient::new(ProviderConfig::new(server.uri())).unwrap()
}

mod probing_tests {
    use super::*;

    #[tokio::test]
    async fn test_third_candidate_wins_after_two_404s() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance/webhook/set"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/instance/webhook"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/instance/webhook/brand_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "webhook": "set" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.set_webhook("brand_1", "http://gw/hook").await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({ "webhook": "set" }));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_hint_skips_known_bad_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState"))
            .and(query_param("instanceName", "brand_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "open" })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.connection_state("brand_2").await.connected);
        assert_eq!(client.hint(Operation::ConnectionState), Some(1));
        assert!(client.connection_state("brand_2").await.connected);

        // 404 + 200, then a single request on the second call.
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "msg": "last" })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let state = client.connection_state("brand_3").await;

        assert!(!state.connected);
        assert_eq!(state.raw.status, 404);
        assert_eq!(state.raw.body, json!({ "msg": "last" }));
    }

    #[tokio::test]
    async fn test_body_shape_rejection_tries_next_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/brand_1"))
            .and(body_json(json!({ "number": "549", "text": "hola" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "textMessage required" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/brand_1"))
            .and(body_json(json!({ "number": "549", "textMessage": { "text": "hola" } })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "key": { "id": "2" } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let sent = client.send_text("brand_1", "549", "hola").await;

        assert!(sent.ok);
        assert_eq!(sent.response.status, 201);
        assert_eq!(client.hint(Operation::SendText), Some(1));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unprocessable_create_body_tries_next_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance/create"))
            .and(body_json(json!({ "name": "brand_9", "webhookUrl": null, "integration": "WHATSAPP" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "instance": "brand_9" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/instance/create"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let created = client_for(&server).create_instance("brand_9", None).await;

        assert_eq!(created.status, 201);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_moves_to_next_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/brand_6"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "open" })))
            .mount(&server)
            .await;

        assert!(client_for(&server).connection_state("brand_6").await.connected);
    }

    #[tokio::test]
    async fn test_network_error_is_structured() {
        let config = ProviderConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
        let client = ProviderClient::new(config).unwrap();

        let sent = client.send_text("brand_1", "549351", "hola").await;
        assert!(!sent.ok);
        assert_eq!(sent.response.status, NETWORK_ERROR_STATUS);
        assert!(sent.response.body["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_json_body_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
            .mount(&server)
            .await;

        let state = client_for(&server).connection_state("brand_4").await;
        assert_eq!(state.raw.status, 500);
        assert_eq!(state.raw.body, json!({ "raw": "gateway exploded" }));
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_retries_next_header_variant_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/brand_1"))
            .and(header("x-api-key", "k"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/brand_1"))
            .and(header("authorization", "Bearer k"))
            .and(body_json(json!({ "number": "549351", "text": "hola" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "key": { "id": "1" } })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ProviderConfig::new(server.uri()).with_api_key("k");
        let client = ProviderClient::new(config).unwrap();
        let sent = client.send_text("brand_1", "549351", "hola").await;

        assert!(sent.ok);
        assert_eq!(sent.response.status, 201);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_all_variants_rejected_moves_to_next_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/brand_5"))
            .respond_with(ResponseTemplate::new(403))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState"))
            .and(header("apikey", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instance": { "state": "open" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = ProviderConfig::new(server.uri()).with_api_key("k");
        let state = ProviderClient::new(config)
            .unwrap()
            .connection_state("brand_5")
            .await;

        assert!(state.connected);
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_started_survives_create_and_webhook_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/brand_7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0 })))
            .mount(&server)
            .await;

        let started = client_for(&server)
            .ensure_started("brand_7", Some("http://gw/hook"))
            .await;

        assert!(started.ok);
        assert_eq!(started.create.status, 404);
        assert_eq!(started.webhook.map(|w| w.status), Some(404));
        assert_eq!(started.connect.status, 200);
    }

    #[tokio::test]
    async fn test_ensure_started_fails_when_create_and_connect_fail() {
        let server = MockServer::start().await;
        let started = client_for(&server).ensure_started("brand_8", None).await;

        assert!(!started.ok);
        assert!(started.webhook.is_none());
    }

    #[tokio::test]
    async fn test_qr_rendered_from_link_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/brand_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instance": { "state": "close" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/brand_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pairingCode": "WZYX1234",
                "code": "2@abcdef"
            })))
            .mount(&server)
            .await;

        let qr = client_for(&server).qr_or_pairing("brand_1").await;

        assert!(!qr.connected);
        assert_eq!(qr.pairing_code.as_deref(), Some("WZYX1234"));
        assert!(qr
            .qr_image
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_failed_qr_fallback_keeps_connect_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/brand_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0 })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/instance/qr/brand_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "waiting" })))
            .mount(&server)
            .await;

        let qr = client_for(&server).qr_or_pairing("brand_2").await;

        assert!(!qr.connected);
        assert!(qr.qr_image.is_none());
        assert!(qr.pairing_code.is_none());
        assert_eq!(qr.raw, json!({ "count": 0 }));
    }

    #[tokio::test]
    async fn test_qr_fallback_payload_replaces_raw() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/brand_3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0 })))
            .mount(&server)
            .await;
        let fallback = json!({ "qrcode": { "base64": "data:image/png;base64,AAAA" } });
        Mock::given(method("GET"))
            .and(path("/instance/qr/brand_3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fallback.clone()))
            .mount(&server)
            .await;

        let qr = client_for(&server).qr_or_pairing("brand_3").await;

        assert_eq!(qr.qr_image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(qr.raw, fallback);
    }

    #[tokio::test]
    async fn test_qr_skipped_when_connected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/brand_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "open" })))
            .mount(&server)
            .await;

        let qr = client_for(&server).qr_or_pairing("brand_1").await;

        assert!(qr.connected);
        assert!(qr.qr_image.is_none());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
