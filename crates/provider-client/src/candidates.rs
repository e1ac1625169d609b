//! Ordered endpoint candidates per operation.
//!
//! Lists are ordered by how often each shape is seen across provider builds;
//! the first accepted candidate wins.

use reqwest::Method;
use serde_json::json;

use crate::types::Candidate;

fn seg(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Instance creation.
pub fn create_instance(name: &str, webhook: Option<&str>, integration: &str) -> Vec<Candidate> {
    let n = seg(name);
    vec![
        Candidate::post(
            "/instance/create",
            json!({ "instanceName": name, "webhook": webhook, "integration": integration }),
        ),
        Candidate::post(
            "/instance/create",
            json!({ "name": name, "webhookUrl": webhook, "integration": integration }),
        ),
        Candidate::new(Method::POST, format!("/instance/create/{n}"))
            .with_query("integration", integration),
        Candidate::post(
            "/instance/add",
            json!({ "instanceName": name, "webhook": webhook, "integration": integration }),
        ),
        Candidate::post(
            "/instance/init",
            json!({ "instanceName": name, "webhook": webhook, "integration": integration }),
        ),
    ]
}

/// Webhook registration.
pub fn set_webhook(name: &str, url: &str) -> Vec<Candidate> {
    let n = seg(name);
    let named = json!({ "instanceName": name, "webhook": url });
    let bare = json!({ "webhook": url });
    let get_named = |path: &str| {
        Candidate::get(path)
            .with_query("instanceName", name)
            .with_query("webhook", url)
    };

    vec![
        Candidate::post("/instance/webhook/set", named.clone()),
        Candidate::post("/instance/webhook", named.clone()),
        Candidate::post(format!("/instance/webhook/{n}"), bare.clone()),
        Candidate::new(Method::PUT, "/instance/webhook").with_body(named.clone()),
        Candidate::new(Method::PUT, format!("/instance/{n}/webhook")).with_body(bare.clone()),
        Candidate::new(Method::PATCH, format!("/instance/{n}/webhook")).with_body(bare.clone()),
        Candidate::post("/instance/setWebhook", named.clone()),
        Candidate::post(format!("/instance/setWebhook/{n}"), bare.clone()),
        get_named("/instance/webhook/set"),
        get_named("/instance/webhook"),
        Candidate::get(format!("/instance/webhook/{n}")).with_query("webhook", url),
        get_named("/instance/setWebhook"),
        Candidate::new(Method::PUT, format!("/instance/{n}/options")).with_body(bare.clone()),
        Candidate::new(Method::PATCH, format!("/instance/{n}/options")).with_body(bare.clone()),
        Candidate::new(Method::PUT, format!("/instance/{n}/settings")).with_body(bare.clone()),
        Candidate::new(Method::PATCH, format!("/instance/{n}/settings")).with_body(bare),
        Candidate::post("/webhook/set", named.clone()),
        Candidate::post("/webhook", named),
        get_named("/webhook/set"),
        get_named("/webhook"),
    ]
}

/// Connect (starts pairing when not linked).
pub fn connect(name: &str) -> Vec<Candidate> {
    vec![
        Candidate::get(format!("/instance/connect/{}", seg(name))),
        Candidate::post("/instance/connect", json!({ "instanceName": name })),
    ]
}

/// Connection state.
pub fn connection_state(name: &str) -> Vec<Candidate> {
    vec![
        Candidate::get(format!("/instance/connectionState/{}", seg(name))),
        Candidate::get("/instance/connectionState").with_query("instanceName", name),
    ]
}

/// QR image or pairing code.
pub fn qr(name: &str) -> Vec<Candidate> {
    let n = seg(name);
    vec![
        Candidate::get("/instance/qr").with_query("instanceName", name),
        Candidate::get(format!("/instance/qr/{n}")),
        Candidate::get("/instance/qrbase64").with_query("instanceName", name),
        Candidate::get("/instance/pairingCode").with_query("instanceName", name),
        Candidate::get(format!("/instance/pairingCode/{n}")),
    ]
}

/// Outbound text message.
pub fn send_text(name: &str, to_number: &str, text: &str) -> Vec<Candidate> {
    let n = seg(name);
    vec![
        Candidate::post(
            format!("/message/sendText/{n}"),
            json!({ "number": to_number, "text": text }),
        ),
        Candidate::post(
            format!("/message/sendText/{n}"),
            json!({ "number": to_number, "textMessage": { "text": text } }),
        ),
        Candidate::post(
            "/message/sendText",
            json!({ "instanceName": name, "number": to_number, "text": text }),
        ),
    ]
}
