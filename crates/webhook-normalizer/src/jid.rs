//! Conversation identifiers and instance names.

/// Domain suffix of a canonical conversation identifier.
pub const JID_SUFFIX: &str = "@s.whatsapp.net";

const INSTANCE_PREFIX: &str = "brand_";

/// Canonical `digits@s.whatsapp.net` form of a number or JID.
///
/// Everything after `@` is discarded before extracting digits. Returns
/// `None` when no digits remain.
pub fn normalize_jid(raw: &str) -> Option<String> {
    let digits = number_from_jid(raw);
    if digits.is_empty() {
        None
    } else {
        Some(format!("{}{}", digits, JID_SUFFIX))
    }
}

/// Digits of a number or JID, ignoring everything after `@` and any
/// `:device` suffix.
pub fn number_from_jid(raw: &str) -> String {
    let local = raw.trim().split('@').next().unwrap_or_default();
    let local = local.split(':').next().unwrap_or_default();
    local.chars().filter(char::is_ascii_digit).collect()
}

/// Provider instance name for a tenant.
pub fn instance_name(tenant_id: i64) -> String {
    format!("{}{}", INSTANCE_PREFIX, tenant_id)
}

/// Tenant ID encoded in an instance name (`brand_{id}`).
pub fn tenant_from_instance(instance: &str) -> Option<i64> {
    instance
        .trim()
        .strip_prefix(INSTANCE_PREFIX)
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
}
