//! One module per subcommand.

pub mod add;
#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod export;
pub mod list;
pub mod remove;
pub mod show;
