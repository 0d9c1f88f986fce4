//! `VaultEntry` — metadata for one encrypted file.
//!
//! The salt is stored in the clear (base64 in JSON): salts are not
//! secret, only the password is.

use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{salt_decode, salt_encode};
use crate::crypto::{MIN_ITERATIONS, SALT_LEN};
use crate::errors::{FileVaultError, Result};

/// One stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    /// Unique id generated at ingest (a UUID v4 string).
    pub id: String,

    /// File name of the source at ingest time.  Not unique.
    pub original_name: String,

    /// Plaintext length in bytes at ingest time.  Display only.
    pub original_size: u64,

    /// File name of the ciphertext blob inside the vault's files directory.
    pub ciphertext_ref: String,

    /// When the file was ingested.
    pub created_at: DateTime<Utc>,

    /// PBKDF2 salt for this entry's key.
    #[serde(serialize_with = "salt_encode", deserialize_with = "salt_decode")]
    pub salt: [u8; SALT_LEN],

    /// PBKDF2 iteration count the key was derived with.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

fn default_kdf_iterations() -> u32 {
    MIN_ITERATIONS
}

impl VaultEntry {
    /// Blob file name for an entry id.
    pub fn ciphertext_ref_for(id: &str) -> String {
        format!("{id}.enc")
    }

    /// Check that the id is a bare file name and `ciphertext_ref` is the
    /// blob name derived from it.
    ///
    /// Snapshots carry no authentication, so an entry read from disk must
    /// pass this before its id is joined onto a vault path.
    pub fn check_blob_ref(&self) -> Result<()> {
        let mut components = Path::new(&self.id).components();
        let plain_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !self.id.contains(['/', '\\']);
        if !plain_name {
            return Err(FileVaultError::SerializationError(format!(
                "entry id '{}' is not a plain file name",
                self.id
            )));
        }

        let expected = Self::ciphertext_ref_for(&self.id);
        if self.ciphertext_ref != expected {
            return Err(FileVaultError::SerializationError(format!(
                "entry '{}' names blob '{}', expected '{expected}'",
                self.id, self.ciphertext_ref
            )));
        }
        Ok(())
    }

    /// Human-readable size, e.g. `"512 B"`, `"1.50 KB"`, `"2.00 MB"`.
    pub fn formatted_size(&self) -> String {
        format_size(self.original_size)
    }

    /// Ingest time formatted as `YYYY-MM-DD HH:MM` (UTC).
    pub fn formatted_time(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Format a byte count with a binary unit and two decimals.
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size < KB {
        format!("{size} B")
    } else if size < MB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else if size < GB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else {
        format!("{:.2} GB", size as f64 / GB as f64)
    }
}
