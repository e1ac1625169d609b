//! Field extraction for state and QR responses, and local QR rendering.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use qrcode::render::svg;
use qrcode::QrCode;
use serde_json::Value;
use tracing::warn;

const CONNECTED_STATES: [&str; 3] = ["open", "connected", "online"];

fn non_empty_str<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Whether a connection-state body reports a linked session.
///
/// The state may sit under an `instance` wrapper or at the top level, as
/// `state`, `status` or `connectionStatus`.
pub fn is_connected(body: &Value) -> bool {
    const KEYS: [&str; 3] = ["state", "status", "connectionStatus"];
    let nested = body.get("instance").and_then(|i| non_empty_str(i, &KEYS));
    let state = nested.or_else(|| non_empty_str(body, &KEYS));
    state
        .map(|s| CONNECTED_STATES.contains(&s.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Short pairing code, if present.
pub fn pairing_code(body: &Value) -> Option<String> {
    non_empty_str(body, &["pairingCode", "pairing_code", "pin", "code_short"]).map(String::from)
}

/// Textual link code that still has to be rendered as a QR image.
pub fn link_code(body: &Value) -> Option<String> {
    non_empty_str(body, &["code", "qrcode", "qrCode"]).map(String::from)
}

/// A ready-made `data:image` URL, if the provider sent one.
pub fn embedded_image(body: &Value) -> Option<String> {
    let nested = body.get("qrcode").filter(|v| v.is_object());
    [Some(body), nested]
        .into_iter()
        .flatten()
        .filter_map(|obj| non_empty_str(obj, &["base64", "qr", "image", "qrcode", "dataUrl"]))
        .find(|value| value.starts_with("data:image"))
        .map(String::from)
}

/// Render a link code into an SVG QR data URL.
pub fn render_data_url(code: &str) -> Option<String> {
    if code.starts_with("data:image") {
        return Some(code.to_string());
    }

    match QrCode::new(code.as_bytes()) {
        Ok(qr) => {
            let image = qr
                .render::<svg::Color>()
                .min_dimensions(256, 256)
                .build();
            Some(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
        }
        Err(e) => {
            warn!("Failed to render QR code: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_locations() {
        assert!(is_connected(&json!({ "instance": { "state": "open" } })));
        assert!(is_connected(&json!({ "state": "CONNECTED" })));
        assert!(is_connected(&json!({ "connectionStatus": "online" })));
        assert!(!is_connected(&json!({ "instance": { "state": "connecting" } })));
        assert!(!is_connected(&json!({ "raw": "<html>" })));
    }

    #[test]
    fn test_embedded_image_nested() {
        let body = json!({ "qrcode": { "base64": "data:image/png;base64,AAA" } });
        assert_eq!(embedded_image(&body).as_deref(), Some("data:image/png;base64,AAA"));
        assert!(embedded_image(&json!({ "qr": "2@abc" })).is_none());
    }

    #[test]
    fn test_render_data_url() {
        let url = render_data_url("2@abcdef,xyz").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));

        let passthrough = render_data_url("data:image/png;base64,AAA").unwrap();
        assert_eq!(passthrough, "data:image/png;base64,AAA");
    }

    #[test]
    fn test_pairing_and_link_code() {
        let body = json!({ "pairingCode": "WZYX-1234", "code": "2@abc" });
        assert_eq!(pairing_code(&body).as_deref(), Some("WZYX-1234"));
        assert_eq!(link_code(&body).as_deref(), Some("2@abc"));
    }
}
