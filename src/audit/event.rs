//! What gets recorded: one vault operation on one entry, and its outcome.

use std::fmt;

use crate::vault::VaultEntry;

/// The vault operations that leave an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOp {
    Add,
    Export,
    Remove,
}

impl AuditOp {
    pub const ALL: [AuditOp; 3] = [AuditOp::Add, AuditOp::Export, AuditOp::Remove];

    pub fn as_str(self) -> &'static str {
        match self {
            AuditOp::Add => "add",
            AuditOp::Export => "export",
            AuditOp::Remove => "remove",
        }
    }

    /// Case-insensitive inverse of `as_str`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for AuditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record before it is written.
///
/// Only metadata is ever captured: ids, display names, sizes, and error
/// messages.  Never passwords or file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub op: AuditOp,
    pub entry_id: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    /// `None` when the operation succeeded.
    pub failure: Option<String>,
}

impl AuditEvent {
    /// An event with nothing known about the entry yet.
    pub fn new(op: AuditOp) -> Self {
        Self {
            op,
            entry_id: None,
            file_name: None,
            file_size: None,
            failure: None,
        }
    }

    /// An event about an existing entry, carrying its id, name, and size.
    pub fn for_entry(op: AuditOp, entry: &VaultEntry) -> Self {
        Self {
            entry_id: Some(entry.id.clone()),
            file_name: Some(entry.original_name.clone()),
            file_size: Some(entry.original_size),
            ..Self::new(op)
        }
    }

    pub fn with_entry_id(mut self, id: impl Into<String>) -> Self {
        self.entry_id = Some(id.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Mark the operation as failed with a human-readable reason.
    pub fn failed(mut self, reason: impl fmt::Display) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}
