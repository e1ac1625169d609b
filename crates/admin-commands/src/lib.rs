//! Inline admin commands.
//!
//! An operator reconfigures a tenant by sending an ordinary chat message of
//! the form `<keyword> <password> <commands>`. The password is checked
//! against the tenant's stored digest (or a process-wide fallback), the
//! sender against the tenant allow-list, and the `;`/newline separated
//! commands are executed as one batch with a single config write.
//!
//! Any message that contains the keyword is reported as handled, so callers
//! never forward it to an agent, even when authentication fails.

pub mod command;
pub mod error;
pub mod interpreter;

pub use command::{parse_command, split_batch, AdminCommand};
pub use error::{AdminError, Result};
pub use interpreter::{
    split_admin_message, AdminInterpreter, AdminOutcome, AdminSettings, DEFAULT_KEYWORD,
};
