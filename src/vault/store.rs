//! `EntryStore` — durable load/save of the entry index.
//!
//! The whole index is rewritten as one snapshot on every save.  Loading
//! never fails the caller: a missing or damaged snapshot yields an empty
//! index and a warning, since refusing to start is worse than losing
//! the listing (the blobs stay on disk either way).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::format::{decode_snapshot, encode_snapshot, write_atomic};
use super::index::EntryIndex;
use crate::errors::{FileVaultError, Result};

/// Reads and writes the metadata snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct EntryStore {
    snapshot_path: PathBuf,
}

impl EntryStore {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Load the index, degrading to empty on any problem.
    pub fn load(&self) -> EntryIndex {
        match self.try_load() {
            Ok(Some(index)) => {
                debug!(
                    path = %self.snapshot_path.display(),
                    entries = index.len(),
                    "loaded vault index"
                );
                index
            }
            Ok(None) => EntryIndex::new(),
            Err(e) => {
                warn!(
                    path = %self.snapshot_path.display(),
                    error = %e,
                    "vault index unreadable, starting with an empty index"
                );
                EntryIndex::new()
            }
        }
    }

    /// Load the index, reporting why it could not be read.
    ///
    /// `Ok(None)` means no snapshot exists yet.
    pub fn try_load(&self) -> Result<Option<EntryIndex>> {
        let data = match fs::read(&self.snapshot_path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entries = decode_snapshot(&data)?;
        Ok(Some(EntryIndex::from_entries(entries)))
    }

    /// Rewrite the snapshot with the full index.
    ///
    /// On `PersistFailed` the previous snapshot is still in place and no
    /// longer matches the caller's in-memory index.
    pub fn save(&self, index: &EntryIndex) -> Result<()> {
        let bytes = encode_snapshot(index.entries())
            .map_err(|e| FileVaultError::PersistFailed(e.to_string()))?;

        write_atomic(&self.snapshot_path, &bytes).map_err(|e| {
            FileVaultError::PersistFailed(format!(
                "cannot write {}: {e}",
                self.snapshot_path.display()
            ))
        })?;

        debug!(
            path = %self.snapshot_path.display(),
            entries = index.len(),
            "saved vault index"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{generate_salt, MIN_ITERATIONS};
    use crate::vault::VaultEntry;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(id: &str, name: &str) -> VaultEntry {
        VaultEntry {
            id: id.into(),
            original_name: name.into(),
            original_size: 7,
            ciphertext_ref: VaultEntry::ciphertext_ref_for(id),
            created_at: Utc::now(),
            salt: generate_salt(),
            kdf_iterations: MIN_ITERATIONS,
        }
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = EntryStore::new(dir.path().join("vault.dat"));
        assert!(store.try_load().unwrap().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_preserves_entries_and_order() {
        let dir = TempDir::new().unwrap();
        let store = EntryStore::new(dir.path().join("vault.dat"));

        let mut index = EntryIndex::new();
        index.push(entry("b-id", "second.txt")).unwrap();
        index.push(entry("a-id", "first.txt")).unwrap();
        store.save(&index).unwrap();

        assert_eq!(store.load(), index);
    }

    #[test]
    fn garbage_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.dat");
        fs::write(&path, b"definitely not a snapshot").unwrap();

        let store = EntryStore::new(&path);
        assert!(store.try_load().is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_into_missing_directory_is_persist_failed() {
        let dir = TempDir::new().unwrap();
        let store = EntryStore::new(dir.path().join("no-such-dir").join("vault.dat"));
        let result = store.save(&EntryIndex::new());
        assert!(matches!(result, Err(FileVaultError::PersistFailed(_))));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = EntryStore::new(dir.path().join("vault.dat"));
        store.save(&EntryIndex::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["vault.dat"]);
    }
}
