//! End-to-end pipeline tests with an in-memory store and mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use admin_commands::{AdminInterpreter, AdminSettings};
use agent_core::{BcryptVerifier, PasswordVerifier, TextGenerator, RESERVATIONS_SYSTEM_PROMPT};
use database::{message, tenant, Database, NewTenant};
use mock_brain::{DelayedGenerator, EchoGenerator, FailingGenerator, RecordingSender, StaticContext};
use orchestrator::{ConversationRouter, MessageOutcome, Pipeline, FALLBACK_REPLY};
use serde_json::{json, Value};

const LEAD_JID: &str = "5493511234567@s.whatsapp.net";

async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

async fn create_tenant(db: &Database, agent_mode: &str) -> i64 {
    tenant::create_tenant(
        db.pool(),
        &NewTenant {
            name: "Cafe Central".into(),
            context: "Specialty coffee shop.".into(),
            agent_mode: agent_mode.into(),
            admin_enabled: true,
            admin_keyword: "#admin".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

fn pipeline(
    db: &Database,
    generator: Arc<dyn TextGenerator>,
    sender: RecordingSender,
) -> Pipeline {
    let router = ConversationRouter::new(
        db.clone(),
        generator,
        Arc::new(StaticContext::empty()),
        Arc::new(sender),
    )
    .with_generation_timeout(Duration::from_millis(200));
    let admin = AdminInterpreter::new(
        db.clone(),
        Arc::new(BcryptVerifier::with_cost(4)),
        AdminSettings::default(),
    );
    Pipeline::new(db.clone(), admin, router)
}

fn upsert(tenant_id: i64, from_me: bool, text: &str, ts: Option<i64>) -> Value {
    let mut data = json!({
        "key": { "remoteJid": LEAD_JID, "fromMe": from_me },
        "message": { "conversation": text }
    });
    if let Some(ts) = ts {
        data["messageTimestamp"] = json!(ts);
    }
    json!({
        "event": "messages.upsert",
        "instance": format!("brand_{tenant_id}"),
        "data": data
    })
}

mod routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_inbound_message_is_stored_and_answered() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let generator = EchoGenerator::with_prefix("Hi! ");
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(generator.clone()), sender.clone());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "hola", Some(1_700_000_000)))
            .await;

        assert_eq!(report.tenant_id, Some(tenant_id));
        assert_eq!(
            report.results,
            vec![MessageOutcome::Replied {
                agent: "ventas".into(),
                fallback: false,
                delivered: true,
            }]
        );

        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].instance, format!("brand_{tenant_id}"));
        assert_eq!(sent[0].to_number, "5493511234567");
        assert!(sent[0].text.starts_with("Hi! "));

        let stored = message::list_conversation(db.pool(), tenant_id, LEAD_JID, 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].text.as_deref(), Some("hola"));
        assert!(!stored[0].from_me);
        assert!(stored[1].from_me);
        assert_eq!(stored[1].agent.as_deref(), Some("ventas"));
    }

    #[tokio::test]
    async fn test_auto_mode_routes_turno_to_reservations() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "auto").await;
        let generator = EchoGenerator::new();
        let pipeline = pipeline(&db, Arc::new(generator.clone()), RecordingSender::new());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "Quiero un turno mañana", None))
            .await;

        assert!(matches!(
            &report.results[0],
            MessageOutcome::Replied { agent, .. } if agent == "reservas"
        ));
        let requests = generator.requests().await;
        assert_eq!(requests[0].system_prompt, RESERVATIONS_SYSTEM_PROMPT);
        assert!(requests[0].user_prompt.contains("Specialty coffee shop."));
    }

    #[tokio::test]
    async fn test_tenant_echo_is_never_answered() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let generator = EchoGenerator::new();
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(generator.clone()), sender.clone());

        let report = pipeline
            .process(
                None,
                &upsert(tenant_id, true, "Thanks for reaching out!", Some(1_700_000_100)),
            )
            .await;

        assert_eq!(report.results, vec![MessageOutcome::Echo { stored: true }]);
        assert!(sender.sent().await.is_empty());
        assert_eq!(generator.call_count().await, 0);

        let stored = message::list_for_tenant(db.pool(), tenant_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].from_me);
    }

    #[tokio::test]
    async fn test_redelivery_is_not_stored_twice() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let pipeline = pipeline(&db, Arc::new(EchoGenerator::new()), RecordingSender::new());
        let payload = upsert(tenant_id, true, "echo", Some(1_700_000_200));

        pipeline.process(None, &payload).await;
        let second = pipeline.process(None, &payload).await;

        assert_eq!(second.results, vec![MessageOutcome::Echo { stored: false }]);
        let stored = message::list_for_tenant(db.pool(), tenant_id).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_ignored() {
        let db = test_db().await;
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(EchoGenerator::new()), sender.clone());

        let report = pipeline.process(None, &upsert(42, false, "hola", None)).await;

        assert_eq!(report.tenant_id, None);
        assert!(report.results.is_empty());
        assert!(sender.sent().await.is_empty());
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_generation_failure_sends_fallback() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(FailingGenerator::new()), sender.clone());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "precio?", None))
            .await;

        assert!(matches!(
            report.results[0],
            MessageOutcome::Replied { fallback: true, delivered: true, .. }
        ));
        assert_eq!(sender.sent().await[0].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_generation_timeout_sends_fallback() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let sender = RecordingSender::new();
        let slow = DelayedGenerator::with_millis(EchoGenerator::new(), 2_000);
        let pipeline = pipeline(&db, Arc::new(slow), sender.clone());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "hola", None))
            .await;

        assert!(matches!(
            report.results[0],
            MessageOutcome::Replied { fallback: true, .. }
        ));
        assert_eq!(sender.sent().await[0].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_send_failure_keeps_persisted_reply() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let pipeline = pipeline(&db, Arc::new(EchoGenerator::new()), RecordingSender::failing());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "hola", None))
            .await;

        assert!(matches!(
            report.results[0],
            MessageOutcome::Replied { delivered: false, .. }
        ));
        let stored = message::list_for_tenant(db.pool(), tenant_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[1].from_me);
    }

    #[tokio::test]
    async fn test_unreadable_datasources_still_answer() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        sqlx::query("DROP TABLE datasources")
            .execute(db.pool())
            .await
            .unwrap();
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(EchoGenerator::with_prefix("Hi! ")), sender.clone());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "hola", Some(1_700_000_300)))
            .await;

        assert!(matches!(
            report.results[0],
            MessageOutcome::Replied { fallback: false, delivered: true, .. }
        ));
        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.starts_with("Hi! "));
    }

    #[tokio::test]
    async fn test_unreadable_tenant_sends_fallback() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        sqlx::query("DROP TABLE tenants")
            .execute(db.pool())
            .await
            .unwrap();
        let generator = EchoGenerator::new();
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(generator.clone()), sender.clone());

        let report = pipeline
            .process(None, &upsert(tenant_id, false, "#admin secret1 cfg show", None))
            .await;

        assert_eq!(report.tenant_id, Some(tenant_id));
        assert!(matches!(
            report.results[0],
            MessageOutcome::Replied { fallback: true, delivered: true, .. }
        ));
        assert_eq!(generator.call_count().await, 0);
        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_batch_continues_after_unaddressable_candidate() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(EchoGenerator::new()), sender.clone());

        let payload = json!({
            "instance": format!("brand_{tenant_id}"),
            "messages": [
                { "text": "who am I?" },
                { "from": "111", "text": "first" },
                { "from": "222", "text": "second" }
            ]
        });
        let report = pipeline.process(None, &payload).await;

        assert_eq!(report.dropped, 1);
        assert_eq!(report.replies(), 2);
        let numbers: Vec<_> = sender.sent().await.into_iter().map(|m| m.to_number).collect();
        assert_eq!(numbers, vec!["111", "222"]);
    }
}

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_message_skips_generation() {
        let db = test_db().await;
        let tenant_id = create_tenant(&db, "ventas").await;
        let digest = BcryptVerifier::with_cost(4).hash("secret1").unwrap();
        tenant::set_admin_password_hash(db.pool(), tenant_id, &digest)
            .await
            .unwrap();

        let generator = EchoGenerator::new();
        let sender = RecordingSender::new();
        let pipeline = pipeline(&db, Arc::new(generator.clone()), sender.clone());

        let ok = pipeline
            .process(
                None,
                &upsert(tenant_id, false, "#admin secret1 set agent=reservas", None),
            )
            .await;
        let denied = pipeline
            .process(
                None,
                &upsert(tenant_id, false, "#admin wrongpass set agent=ventas", None),
            )
            .await;

        assert_eq!(ok.results, vec![MessageOutcome::Admin { delivered: true }]);
        assert_eq!(denied.results, vec![MessageOutcome::Admin { delivered: true }]);
        assert_eq!(generator.call_count().await, 0);

        let sent = sender.sent().await;
        assert!(sent[0].text.contains("agent_mode"));
        assert!(sent[1].text.contains("denied"));

        let stored = tenant::get_tenant(db.pool(), tenant_id).await.unwrap();
        assert_eq!(stored.agent_mode, "reservas");
    }
}
