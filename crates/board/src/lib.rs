//! Conversation board for the WhatsApp gateway.
//!
//! The board is a grouped, sorted view over a tenant's conversations: the
//! message log is reduced to the latest message per conversation, joined
//! with per-conversation metadata (column, priority, interest, tags, pin and
//! archive flags) and bucketed by one of four [`GroupBy`] modes.
//!
//! Aggregation in [`build_board`] is pure and deterministic. Metadata edits
//! go through [`BoardService`], which serializes read-modify-write cycles
//! per (tenant, conversation) so concurrent edits never lose updates.

mod aggregate;
mod error;
mod meta;
mod model;
mod service;

pub use aggregate::{build_board, interest_bucket, priority_bucket};
pub use error::{BoardError, Result};
pub use meta::{normalize_column, normalize_tags, MetaGuard, MetaLocks, MetaPatch};
pub use model::{BoardColumn, BoardQuery, ChatSummary, GroupBy, DEFAULT_LIMIT};
pub use service::BoardService;
