//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use admin_commands::{AdminSettings, DEFAULT_KEYWORD};
use provider_client::{ProviderConfig, DEFAULT_TIMEOUT};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    pub provider: ProviderConfig,
    pub webhook: WebhookSettings,
    pub admin: AdminSettings,
    /// Key required on management endpoints (`X-API-Key` or bearer).
    pub api_key: Option<String>,
    /// Bound on a single agent generation.
    pub generation_timeout: Duration,
}

/// Settings for building and checking the provider webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Shared secret expected in `?token=` or `X-Webhook-Token`.
    pub token: String,
    /// Public URL of this gateway, used to build the webhook URL.
    pub public_base_url: Option<String>,
}

impl WebhookSettings {
    /// Webhook URL registered with the provider for an instance.
    pub fn url_for(&self, instance: &str) -> Option<String> {
        self.public_base_url.as_ref().map(|base| {
            format!(
                "{}/api/wa/webhook?token={}&instance={}",
                base,
                urlencoding::encode(&self.token),
                urlencoding::encode(instance)
            )
        })
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    match var(name) {
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid(name.to_string(), raw)),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GATEWAY_ADDR` | Server bind address | `0.0.0.0:8000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:gateway.db?mode=rwc` |
    /// | `EVOLUTION_BASE_URL` | Provider base URL | (required) |
    /// | `EVOLUTION_API_KEY` | Provider key | unset |
    /// | `EVOLUTION_INTEGRATION` | Integration label on create | `WHATSAPP` |
    /// | `EVOLUTION_TIMEOUT_SECS` | Provider request timeout | `25` |
    /// | `EVOLUTION_WEBHOOK_TOKEN` | Webhook shared secret | `evolution` |
    /// | `PUBLIC_BASE_URL` | Public URL of this gateway | unset |
    /// | `WA_SUPERADMIN_PASSWORD` | Fallback admin password | unset |
    /// | `WA_SUPERADMIN_NUMBERS` | Comma list added to every allow-list | empty |
    /// | `WA_SUPERADMIN_KEYWORD` | Keyword for tenants without one | `#admin` |
    /// | `GATEWAY_API_KEY` | Key for management endpoints | unset |
    /// | `GENERATION_TIMEOUT_SECS` | Generation bound | `60` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = var("GATEWAY_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite:gateway.db?mode=rwc".to_string());

        let base_url = var("EVOLUTION_BASE_URL").ok_or(ConfigError::Missing("EVOLUTION_BASE_URL"))?;
        let mut provider = ProviderConfig::new(base_url)
            .with_api_key(var("EVOLUTION_API_KEY").unwrap_or_default())
            .with_timeout(secs("EVOLUTION_TIMEOUT_SECS", DEFAULT_TIMEOUT)?);
        if let Some(integration) = var("EVOLUTION_INTEGRATION") {
            provider = provider.with_integration(integration);
        }

        let webhook = WebhookSettings {
            token: var("EVOLUTION_WEBHOOK_TOKEN").unwrap_or_else(|| "evolution".to_string()),
            public_base_url: var("PUBLIC_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
        };

        let admin = AdminSettings {
            fallback_password: var("WA_SUPERADMIN_PASSWORD"),
            extra_allow_list: var("WA_SUPERADMIN_NUMBERS")
                .map(|list| {
                    list.split(',')
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            default_keyword: var("WA_SUPERADMIN_KEYWORD")
                .unwrap_or_else(|| DEFAULT_KEYWORD.to_string()),
        };

        Ok(Self {
            addr,
            database_url,
            provider,
            webhook,
            admin,
            api_key: var("GATEWAY_API_KEY"),
            generation_timeout: secs("GENERATION_TIMEOUT_SECS", Duration::from_secs(60))?,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid GATEWAY_ADDR format")]
    InvalidAddr,

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url() {
        let settings = WebhookSettings {
            token: "s3cret&x".into(),
            public_base_url: Some("https://gw.example.com".into()),
        };
        assert_eq!(
            settings.url_for("brand_7").as_deref(),
            Some("https://gw.example.com/api/wa/webhook?token=s3cret%26x&instance=brand_7")
        );

        let none = WebhookSettings {
            token: "t".into(),
            public_base_url: None,
        };
        assert_eq!(none.url_for("brand_7"), None);
    }
}
