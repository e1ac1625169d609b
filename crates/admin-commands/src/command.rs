//! Admin command parsing.

/// One command from an admin batch.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Help,
    /// `set <key>=<value>` (or `key:value`).
    Set { key: String, value: String },
    /// `rulemd=<markdown>`
    RuleMarkdown(String),
    /// `rulejson=<json>`, kept verbatim.
    RuleJson(String),
    /// `cfg show`
    ShowConfig,
    /// `ds add name=.. kind=.. url=..`; missing fields are empty.
    AddDatasource { name: String, kind: String, url: String },
    /// `ds del id=..`; `None` when the id is missing or not a number.
    DeleteDatasource { id: Option<i64> },
    Unknown(String),
}

/// Split a batch on `;` and newlines into trimmed, non-empty commands.
pub fn split_batch(batch: &str) -> Vec<&str> {
    batch
        .split([';', '\n', '\r'])
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Split `key=value` or `key:value`; a bare word has an empty value.
fn key_value(segment: &str) -> (String, String) {
    let split = segment
        .split_once('=')
        .or_else(|| segment.split_once(':'));
    match split {
        Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
        None => (segment.trim().to_string(), String::new()),
    }
}

/// `key=value` pairs after the first two words (`ds add ...`).
fn datasource_args(command: &str) -> Vec<(String, String)> {
    command
        .split_whitespace()
        .skip(2)
        .map(key_value)
        .collect()
}

fn arg(args: &[(String, String)], key: &str) -> String {
    args.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}

/// Parse one command. Keywords are case-insensitive; values keep their case.
pub fn parse_command(command: &str) -> AdminCommand {
    let command = command.trim();
    let lower = command.to_lowercase();

    if matches!(lower.as_str(), "help" | "ayuda" | "?") {
        return AdminCommand::Help;
    }

    if lower.starts_with("set ") {
        let (key, value) = key_value(&command[4..]);
        return AdminCommand::Set {
            key: key.to_lowercase(),
            value,
        };
    }

    if lower.starts_with("rulemd") {
        return AdminCommand::RuleMarkdown(key_value(command).1);
    }

    if lower.starts_with("rulejson") {
        return AdminCommand::RuleJson(key_value(command).1);
    }

    if lower.split_whitespace().collect::<Vec<_>>() == ["cfg", "show"] {
        return AdminCommand::ShowConfig;
    }

    if lower.starts_with("ds add") {
        let args = datasource_args(command);
        let kind = arg(&args, "kind");
        return AdminCommand::AddDatasource {
            name: arg(&args, "name"),
            kind: if kind.is_empty() {
                "postgres".to_string()
            } else {
                kind.to_lowercase()
            },
            url: arg(&args, "url"),
        };
    }

    if lower.starts_with("ds del") {
        let args = datasource_args(command);
        let id = arg(&args, "id").parse::<i64>().ok().filter(|id| *id > 0);
        return AdminCommand::DeleteDatasource { id };
    }

    AdminCommand::Unknown(command.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_batch() {
        assert_eq!(
            split_batch("set agent=auto; set temp=0.3\n\ncfg show;"),
            vec!["set agent=auto", "set temp=0.3", "cfg show"]
        );
    }

    #[test]
    fn test_parse_set_variants() {
        assert_eq!(
            parse_command("SET Agent=reservas"),
            AdminCommand::Set {
                key: "agent".into(),
                value: "reservas".into()
            }
        );
        assert_eq!(
            parse_command("set model:gpt-4o"),
            AdminCommand::Set {
                key: "model".into(),
                value: "gpt-4o".into()
            }
        );
    }

    #[test]
    fn test_parse_rules_keep_value_verbatim() {
        assert_eq!(
            parse_command("rulemd=**Open** 9-18"),
            AdminCommand::RuleMarkdown("**Open** 9-18".into())
        );
        assert_eq!(
            parse_command(r#"rulejson={"max_people": 6}"#),
            AdminCommand::RuleJson(r#"{"max_people": 6}"#.into())
        );
    }

    #[test]
    fn test_parse_datasource_commands() {
        assert_eq!(
            parse_command("ds add name=stock kind=HTTP url=https://api.example.com/stock?q=1"),
            AdminCommand::AddDatasource {
                name: "stock".into(),
                kind: "http".into(),
                url: "https://api.example.com/stock?q=1".into()
            }
        );
        assert_eq!(
            parse_command("ds del id=4"),
            AdminCommand::DeleteDatasource { id: Some(4) }
        );
        assert_eq!(
            parse_command("ds del id=four"),
            AdminCommand::DeleteDatasource { id: None }
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("ayuda"), AdminCommand::Help);
        assert_eq!(parse_command("cfg   SHOW"), AdminCommand::ShowConfig);
        assert_eq!(
            parse_command("reboot"),
            AdminCommand::Unknown("reboot".into())
        );
    }
}
