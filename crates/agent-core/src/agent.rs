//! Agent selection types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tenant-level agent mode as stored in the tenant configuration.
///
/// Stored values are the short names operators type in admin commands
/// (`ventas`, `reservas`, `auto`); English aliases are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Always answer with the sales agent.
    #[default]
    Sales,
    /// Always answer with the reservations agent.
    Reservations,
    /// Pick the agent per message with the keyword heuristic.
    Auto,
}

impl AgentMode {
    /// Canonical stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "ventas",
            Self::Reservations => "reservas",
            Self::Auto => "auto",
        }
    }

    /// Parse a stored or operator-supplied value, returning `None` if unknown.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ventas" | "sales" => Some(Self::Sales),
            "reservas" | "reservations" => Some(Self::Reservations),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

impl FromStr for AgentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown agent mode: {}", s))
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete conversational agent that produces a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Sales,
    Reservations,
}

impl Agent {
    /// Name recorded on persisted outbound messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "ventas",
            Self::Reservations => "reservas",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_mode_parse_aliases() {
        assert_eq!(AgentMode::parse("ventas"), Some(AgentMode::Sales));
        assert_eq!(AgentMode::parse("Sales"), Some(AgentMode::Sales));
        assert_eq!(AgentMode::parse(" reservas "), Some(AgentMode::Reservations));
        assert_eq!(AgentMode::parse("reservations"), Some(AgentMode::Reservations));
        assert_eq!(AgentMode::parse("AUTO"), Some(AgentMode::Auto));
        assert_eq!(AgentMode::parse("support"), None);
    }

    #[test]
    fn test_agent_mode_stored_form() {
        assert_eq!(AgentMode::Reservations.as_str(), "reservas");
        assert_eq!("reservas".parse::<AgentMode>().unwrap().to_string(), "reservas");
    }
}
