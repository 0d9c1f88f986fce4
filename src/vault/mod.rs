//! Vault module — encrypted file storage.
//!
//! This module provides:
//! - The `VaultEntry` metadata record (`entry`)
//! - The ordered in-memory `EntryIndex` with identifier resolution (`index`)
//! - Binary snapshot format with checksum verification (`format`)
//! - Snapshot load/save via `EntryStore` (`store`)
//! - High-level `VaultCore` for ingest, export, remove, and lookup (`manager`)

pub mod entry;
pub mod format;
pub mod index;
pub mod manager;
pub mod store;

// Re-export the most commonly used items.
pub use entry::VaultEntry;
pub use index::EntryIndex;
pub use manager::{VaultCore, FILES_DIR, SNAPSHOT_FILE};
pub use store::EntryStore;
