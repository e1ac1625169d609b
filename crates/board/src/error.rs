//! Board errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// The conversation identifier has no digits.
    #[error("invalid jid: {0}")]
    InvalidJid(String),

    /// Unknown grouping mode.
    #[error("invalid group: {0} (expected column, priority, interest or tag)")]
    InvalidGroup(String),
}

pub type Result<T> = std::result::Result<T, BoardError>;
