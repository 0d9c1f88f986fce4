//! Audit trail of vault operations.
//!
//! `AuditEvent` describes an add, export, or remove and whether it
//! succeeded.  With the `audit-log` feature, events are kept in a local
//! SQLite database next to the vault and can be queried by time, entry,
//! operation, or outcome.

mod event;
#[cfg(feature = "audit-log")]
mod sqlite;

pub use event::{AuditEvent, AuditOp};
#[cfg(feature = "audit-log")]
pub use sqlite::{log_event, AuditFilter, AuditLog, AuditRecord};
