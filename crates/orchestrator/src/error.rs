//! Error types for pipeline operations.

use thiserror::Error;

/// Errors that can occur while handling one inbound message.
///
/// The pipeline records these per message and keeps going with the rest of
/// the delivery.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Store read or write failed.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Admin handling failed after authentication.
    #[error("admin error: {0}")]
    Admin(#[from] admin_commands::AdminError),

    /// A collaborator could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),
}
