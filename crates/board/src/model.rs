//! Board view types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Conversations shown per board unless a limit is given.
pub const DEFAULT_LIMIT: usize = 500;

/// How conversations are bucketed into columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Column,
    Priority,
    Interest,
    Tag,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Priority => "priority",
            Self::Interest => "interest",
            Self::Tag => "tag",
        }
    }
}

impl FromStr for GroupBy {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "column" => Ok(Self::Column),
            "priority" => Ok(Self::Priority),
            "interest" => Ok(Self::Interest),
            "tag" => Ok(Self::Tag),
            other => Err(BoardError::InvalidGroup(other.to_string())),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardQuery {
    pub group_by: GroupBy,
    pub include_archived: bool,
    /// Case-insensitive substring over number, title and tags.
    pub search: Option<String>,
    /// Maximum conversations after sorting.
    pub limit: usize,
}

impl Default for BoardQuery {
    fn default() -> Self {
        Self {
            group_by: GroupBy::Column,
            include_archived: false,
            search: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One conversation on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub jid: String,
    pub number: String,
    /// Title override, else the number.
    pub name: String,
    /// Always 0; read receipts are not tracked.
    pub unread: u32,
    pub last_message_text: Option<String>,
    pub last_message_at: i64,
    pub column: String,
    pub priority: i64,
    pub interest: i64,
    pub color: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

/// A named bucket of conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub key: String,
    pub title: String,
    pub color: Option<String>,
    pub count: usize,
    pub chats: Vec<ChatSummary>,
}
