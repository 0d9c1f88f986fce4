//! Binary metadata snapshot format and checksum verification.
//!
//! `vault.dat` has this layout:
//!
//! ```text
//! [FVLT: 4 bytes][version: 1 byte][entries JSON][SHA-256: 32 bytes]
//! ```
//!
//! - **Magic** (`FVLT`): identifies the file as a FileVault snapshot.
//! - **Version**: format version (currently `1`).
//! - **Entries JSON**: serialized `Vec<VaultEntry>`, in index order.
//! - **SHA-256**: digest over magic + version + JSON, so a torn or
//!   bit-rotted snapshot is detected instead of half-parsed.
//!
//! The checksum is unkeyed.  Anyone who can write `vault.dat` can forge a
//! valid one, so decoding also rejects entries whose id or blob name would
//! reach outside the files directory.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::entry::VaultEntry;
use crate::crypto::SALT_LEN;
use crate::errors::{FileVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every snapshot.
const MAGIC: &[u8; 4] = b"FVLT";

/// Current snapshot format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the trailing checksum.
const CHECKSUM_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Serialize entries into snapshot bytes.
pub fn encode_snapshot(entries: &[VaultEntry]) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(entries)
        .map_err(|e| FileVaultError::SerializationError(format!("entries: {e}")))?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + body.len() + CHECKSUM_LEN);
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&body); // entries JSON

    let digest = Sha256::digest(&buf);
    buf.extend_from_slice(&digest); // 32 bytes
    Ok(buf)
}

/// Parse and verify snapshot bytes.
pub fn decode_snapshot(data: &[u8]) -> Result<Vec<VaultEntry>> {
    if data.len() < PREFIX_LEN + CHECKSUM_LEN {
        return Err(FileVaultError::SerializationError(
            "snapshot too small".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(FileVaultError::SerializationError(
            "missing FVLT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(FileVaultError::SerializationError(format!(
            "unsupported snapshot version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let (covered, stored_checksum) = data.split_at(data.len() - CHECKSUM_LEN);
    if Sha256::digest(covered).as_slice() != stored_checksum {
        return Err(FileVaultError::SerializationError(
            "snapshot checksum mismatch".into(),
        ));
    }

    let entries: Vec<VaultEntry> = serde_json::from_slice(&covered[PREFIX_LEN..])
        .map_err(|e| FileVaultError::SerializationError(format!("entries JSON: {e}")))?;
    for entry in &entries {
        entry.check_blob_ref()?;
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// File IO
// ---------------------------------------------------------------------------

/// Write `bytes` to `path` **atomically**.
///
/// 1. Write to a temp file in the same directory.
/// 2. Sync it to disk.
/// 3. Rename it over the target path.
///
/// The rename ensures readers never see a half-written snapshot.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        restrict_permissions(&tmp_path);
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Set owner-only permissions on Unix.  Failures are ignored.
pub(crate) fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = if path.is_dir() { 0o700 } else { 0o600 };
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
    }
    #[cfg(not(unix))]
    let _ = path;
}

// ---------------------------------------------------------------------------
// Serde helpers for the base64-encoded salt
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn salt_encode<S>(
    salt: &[u8; SALT_LEN],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(salt))
}

pub(crate) fn salt_decode<'de, D>(deserializer: D) -> std::result::Result<[u8; SALT_LEN], D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
    <[u8; SALT_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        serde::de::Error::custom(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}
