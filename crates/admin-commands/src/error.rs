//! Admin command errors.

use thiserror::Error;

/// Errors that abort admin handling for one message.
///
/// Authentication failures are not errors; they are handled outcomes with a
/// rejection reply.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Reading or persisting tenant state failed.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Hashing a new admin password failed.
    #[error("password error: {0}")]
    Password(#[from] agent_core::AgentError),

    /// A new admin password was rejected.
    #[error("invalid password: {0}")]
    InvalidPassword(String),
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
