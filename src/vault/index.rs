//! `EntryIndex` — the ordered, in-memory collection of live entries.

use super::entry::VaultEntry;
use crate::errors::{FileVaultError, Result};

/// Live entries in insertion order.
///
/// Entries are only ever appended or removed, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryIndex {
    entries: Vec<VaultEntry>,
}

impl EntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a decoded snapshot, keeping its order.
    pub fn from_entries(entries: Vec<VaultEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VaultEntry] {
        &self.entries
    }

    /// Append an entry.  Fails if an entry with the same id is live.
    pub fn push(&mut self, entry: VaultEntry) -> Result<()> {
        if self.get(&entry.id).is_some() {
            return Err(FileVaultError::InvalidInput(format!(
                "duplicate entry id '{}'",
                entry.id
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Exact-id lookup.
    pub fn get(&self, id: &str) -> Option<&VaultEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove the entry with exactly this id, returning it.
    pub fn remove(&mut self, id: &str) -> Option<VaultEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Resolve a user-supplied identifier.
    ///
    /// Tried first as a zero-based position in the current order.  If it
    /// is not a number or is out of range, it is matched against ids:
    /// the first entry whose id equals or starts with it wins.  Positions
    /// are only stable within one session.
    ///
    /// Ambiguity is left as is: an in-range number always means a position
    /// even when it is also an id prefix, and a prefix shared by several
    /// ids silently picks the oldest.  Callers that mutate should resolve
    /// once and pass the full id on.
    ///
    /// Two departures from plain `starts_with` matching: surrounding
    /// whitespace is trimmed, and an empty or blank identifier matches
    /// nothing instead of the first entry.
    pub fn resolve(&self, identifier: &str) -> Option<&VaultEntry> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }

        if let Ok(position) = identifier.parse::<usize>() {
            if let Some(entry) = self.entries.get(position) {
                return Some(entry);
            }
        }

        self.entries
            .iter()
            .find(|e| e.id == identifier || e.id.starts_with(identifier))
    }
}
