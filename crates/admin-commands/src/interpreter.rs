//! Password-gated admin command execution.

use std::sync::Arc;

use agent_core::{AgentMode, Parsed, PasswordVerifier};
use database::{datasource, tenant, Database, Tenant, TenantConfigUpdate};
use regex::Regex;
use tracing::{debug, error, info, warn};
use webhook_normalizer::number_from_jid;

use crate::command::{parse_command, split_batch, AdminCommand};
use crate::error::{AdminError, Result};

/// Default trigger keyword.
pub const DEFAULT_KEYWORD: &str = "#admin";

/// Minimum accepted length for a new admin password.
const MIN_PASSWORD_LEN: usize = 6;

const HELP_TEXT: &str = "Admin commands:\n\
- help\n\
- set agent=ventas|reservas|auto\n\
- set model=<name> (empty clears)\n\
- set temp=0..1\n\
- rulemd=<markdown>\n\
- rulejson=<json>\n\
- cfg show\n\
- ds add name=<name> kind=postgres|http url=<url>\n\
- ds del id=<id>\n\
Separate commands with `;` or new lines.";

/// Process-wide admin settings layered over each tenant's own config.
#[derive(Debug, Clone)]
pub struct AdminSettings {
    /// Legacy plaintext password accepted for every tenant.
    pub fallback_password: Option<String>,
    /// Numbers merged into every tenant's allow-list.
    pub extra_allow_list: Vec<String>,
    /// Keyword used when a tenant has none configured.
    pub default_keyword: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            fallback_password: None,
            extra_allow_list: Vec::new(),
            default_keyword: DEFAULT_KEYWORD.to_string(),
        }
    }
}

/// Outcome of inspecting one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminOutcome {
    /// When true the message must not be routed to an agent.
    pub handled: bool,
    pub reply: String,
    /// Config fields changed by the batch, in first-change order.
    pub changed: Vec<String>,
}

impl AdminOutcome {
    fn not_handled() -> Self {
        Self::default()
    }

    fn reply(reply: impl Into<String>) -> Self {
        Self {
            handled: true,
            reply: reply.into(),
            changed: Vec::new(),
        }
    }
}

/// Mutable copy of the tenant config plus the batch transcript.
struct Batch {
    config: TenantConfigUpdate,
    changed: Vec<String>,
    lines: Vec<String>,
}

impl Batch {
    fn mark(&mut self, field: &str) {
        if !self.changed.iter().any(|f| f == field) {
            self.changed.push(field.to_string());
        }
    }

    fn summary(&self) -> String {
        if self.changed.is_empty() && self.lines.is_empty() {
            return "Admin OK (no changes). Send `help` to list commands.".to_string();
        }
        let mut out = String::new();
        if !self.changed.is_empty() {
            out.push_str(&format!("Changes: {}\n", self.changed.join(", ")));
        }
        out.push_str(&self.lines.join("\n"));
        out.trim_end().to_string()
    }
}

/// Interprets `<keyword> <password> <batch>` messages for a tenant.
#[derive(Clone)]
pub struct AdminInterpreter {
    db: Database,
    verifier: Arc<dyn PasswordVerifier>,
    settings: AdminSettings,
}

impl AdminInterpreter {
    pub fn new(db: Database, verifier: Arc<dyn PasswordVerifier>, settings: AdminSettings) -> Self {
        Self {
            db,
            verifier,
            settings,
        }
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    /// Handle `text` if it is an admin message for `tenant_id`.
    ///
    /// Returns `handled = false` when admin mode is off, the tenant is
    /// unknown, or the keyword does not appear in the text. Every other path,
    /// including rejected passwords and senders, is handled.
    pub async fn try_handle(
        &self,
        tenant_id: i64,
        sender: &str,
        text: &str,
    ) -> Result<AdminOutcome> {
        let tenant = match tenant::get_tenant(self.db.pool(), tenant_id).await {
            Ok(tenant) => tenant,
            Err(database::DatabaseError::NotFound { .. }) => {
                return Ok(AdminOutcome::not_handled())
            }
            Err(e) => return Err(e.into()),
        };

        if !tenant.admin_enabled {
            return Ok(AdminOutcome::not_handled());
        }

        let keyword = if tenant.admin_keyword.trim().is_empty() {
            self.settings.default_keyword.as_str()
        } else {
            tenant.admin_keyword.trim()
        };
        if !text.contains(keyword) {
            return Ok(AdminOutcome::not_handled());
        }

        let Some((password, batch)) = split_admin_message(keyword, text) else {
            return Ok(AdminOutcome::reply(format!(
                "Invalid admin format. Use: {keyword} <password> <commands>"
            )));
        };

        if !self.password_matches(&tenant, &password) {
            warn!(tenant_id, "Admin password rejected");
            return Ok(AdminOutcome::reply("Admin access denied: wrong password."));
        }

        if !self.sender_allowed(&tenant, sender) {
            warn!(tenant_id, sender = %sender, "Admin sender not in allow-list");
            return Ok(AdminOutcome::reply(
                "Admin access denied: this number is not authorized.",
            ));
        }

        let outcome = self.execute(&tenant, &batch).await;
        info!(
            tenant_id,
            changed = ?outcome.changed,
            "Admin batch executed"
        );
        Ok(outcome)
    }

    /// Hash and store a new admin password for a tenant.
    pub async fn set_password(&self, tenant_id: i64, secret: &str) -> Result<()> {
        if secret.trim().chars().count() < MIN_PASSWORD_LEN {
            return Err(AdminError::InvalidPassword(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let digest = self.verifier.hash(secret.trim())?;
        tenant::set_admin_password_hash(self.db.pool(), tenant_id, &digest).await?;
        info!(tenant_id, "Admin password updated");
        Ok(())
    }

    fn password_matches(&self, tenant: &Tenant, password: &str) -> bool {
        let by_digest = tenant
            .admin_password_hash
            .as_deref()
            .filter(|d| !d.is_empty())
            .is_some_and(|digest| self.verifier.verify(password, digest));

        let by_fallback = self
            .settings
            .fallback_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .is_some_and(|p| p == password);

        by_digest || by_fallback
    }

    /// Empty combined allow-list admits any sender.
    fn sender_allowed(&self, tenant: &Tenant, sender: &str) -> bool {
        let allowed: Vec<String> = tenant
            .allow_list()
            .iter()
            .chain(self.settings.extra_allow_list.iter())
            .map(|n| number_from_jid(n))
            .filter(|n| !n.is_empty())
            .collect();

        if allowed.is_empty() {
            return true;
        }

        let sender = number_from_jid(sender);
        !sender.is_empty() && allowed.iter().any(|n| *n == sender)
    }

    async fn execute(&self, tenant: &Tenant, batch_text: &str) -> AdminOutcome {
        let mut batch = Batch {
            config: TenantConfigUpdate::from(tenant),
            changed: Vec::new(),
            lines: Vec::new(),
        };

        // A failing command is reported and the rest of the batch still runs.
        for raw in split_batch(batch_text) {
            let command = parse_command(raw);
            debug!(tenant_id = tenant.id, ?command, "Admin command");
            if let Err(e) = self.apply(tenant, command, &mut batch).await {
                warn!(tenant_id = tenant.id, "Admin command `{}` failed: {}", raw, e);
                batch.lines.push(format!("⚠️ `{raw}` failed: {e}"));
            }
        }

        let config_changed = batch
            .changed
            .iter()
            .any(|f| !f.starts_with("datasource"));
        if config_changed {
            if let Err(e) = tenant::update_config(self.db.pool(), tenant.id, &batch.config).await {
                error!(tenant_id = tenant.id, "Failed to save admin changes: {}", e);
                batch.changed.retain(|f| f.starts_with("datasource"));
                batch.lines.push(format!("⚠️ config changes were not saved: {e}"));
            }
        }

        AdminOutcome {
            handled: true,
            reply: batch.summary(),
            changed: batch.changed,
        }
    }

    async fn apply(&self, tenant: &Tenant, command: AdminCommand, batch: &mut Batch) -> Result<()> {
        match command {
            AdminCommand::Help => batch.lines.push(HELP_TEXT.to_string()),

            AdminCommand::Set { key, value } => apply_set(&key, &value, batch),

            AdminCommand::RuleMarkdown(md) => {
                batch.config.rules_md = Some(md).filter(|s| !s.is_empty());
                batch.mark("rules_md");
            }

            AdminCommand::RuleJson(raw) => {
                let parsed = Parsed::or_fallback(
                    serde_json::from_str::<serde_json::Value>(&raw),
                    serde_json::Value::Null,
                );
                if let Some(error) = parsed.error() {
                    batch
                        .lines
                        .push(format!("⚠️ rulejson is not valid JSON ({error}); stored as-is."));
                }
                batch.config.rules_json = Some(raw).filter(|s| !s.is_empty());
                batch.mark("rules_json");
            }

            AdminCommand::ShowConfig => batch.lines.push(show_config(tenant, &batch.config)),

            AdminCommand::AddDatasource { name, kind, url } => {
                if name.is_empty() || url.is_empty() {
                    batch
                        .lines
                        .push("⚠️ ds add requires name=<name> and url=<url>.".to_string());
                } else if kind != "postgres" && kind != "http" {
                    batch
                        .lines
                        .push(format!("⚠️ unsupported datasource kind: {kind}"));
                } else {
                    let id =
                        datasource::add_datasource(self.db.pool(), tenant.id, &name, &kind, &url)
                            .await?;
                    batch.lines.push(format!("Datasource added: id={id} {name} ({kind})"));
                    batch.mark("datasources");
                }
            }

            AdminCommand::DeleteDatasource { id: None } => {
                batch.lines.push("⚠️ ds del requires id=<id>.".to_string());
            }

            AdminCommand::DeleteDatasource { id: Some(id) } => {
                if datasource::delete_datasource(self.db.pool(), tenant.id, id).await? {
                    batch.lines.push(format!("Datasource deleted: id={id}"));
                    batch.mark("datasources");
                } else {
                    batch.lines.push(format!("⚠️ datasource id={id} not found"));
                }
            }

            AdminCommand::Unknown(raw) => {
                batch.lines.push(format!("⚠️ unknown command: {raw}"));
            }
        }
        Ok(())
    }
}

fn apply_set(key: &str, value: &str, batch: &mut Batch) {
    match key {
        "agent" | "agent_mode" | "mode" => match AgentMode::parse(value) {
            Some(mode) => {
                batch.config.agent_mode = mode.as_str().to_string();
                batch.mark("agent_mode");
            }
            None => batch
                .lines
                .push(format!("⚠️ invalid agent: {value} (use ventas|reservas|auto)")),
        },
        "model" | "model_name" => {
            batch.config.model_name = Some(value.to_string()).filter(|v| !v.is_empty());
            batch.mark("model_name");
        }
        "temp" | "temperature" => match value.parse::<f64>() {
            Ok(t) if (0.0..=1.0).contains(&t) => {
                batch.config.temperature = t;
                batch.mark("temperature");
            }
            _ => batch
                .lines
                .push(format!("⚠️ invalid temperature: {value} (must be between 0 and 1)")),
        },
        other => batch.lines.push(format!("⚠️ unknown setting: {other}")),
    }
}

fn show_config(tenant: &Tenant, config: &TenantConfigUpdate) -> String {
    format!(
        "Config:\n- agent_mode: {}\n- model_name: {}\n- temperature: {}\n- admin_enabled: {}\n- admin_keyword: {}\n- rules_md: {}\n- rules_json: {}",
        config.agent_mode,
        config.model_name.as_deref().unwrap_or("(default)"),
        config.temperature,
        tenant.admin_enabled,
        tenant.admin_keyword,
        if config.rules_md.is_some() { "set" } else { "empty" },
        if config.rules_json.is_some() { "set" } else { "empty" },
    )
}

/// Split `<keyword> <password> <batch>` into password and batch.
///
/// The batch may span several lines.
pub fn split_admin_message(keyword: &str, text: &str) -> Option<(String, String)> {
    let pattern = format!(r"(?is){}\s+(\S+)\s*(.*)$", regex::escape(keyword));
    let caps = Regex::new(&pattern).ok()?.captures(text)?;
    let password = caps.get(1)?.as_str().to_string();
    let batch = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some((password, batch))
}
