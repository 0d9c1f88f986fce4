//! `VaultCore` — the operations a front end calls.
//!
//! A vault root looks like:
//!
//! ```text
//! <root>/vault.dat          metadata snapshot
//! <root>/files/<id>.enc     one ciphertext blob per entry
//! ```
//!
//! Every mutation of the index (append, remove) and the snapshot save
//! that follows it happen under one mutex, so concurrent callers cannot
//! lose each other's updates.  Key derivation and file IO block the
//! calling thread; interactive callers should run these off their UI
//! thread.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::entry::VaultEntry;
use super::format::{restrict_permissions, write_atomic};
use super::index::EntryIndex;
use super::store::EntryStore;
use crate::config::Settings;
use crate::crypto::{
    derive_key_with_iterations, generate_salt, open, seal, Password, MIN_ITERATIONS,
};
use crate::erase::secure_erase;
use crate::errors::{FileVaultError, Result};

/// File name of the metadata snapshot inside the vault root.
pub const SNAPSHOT_FILE: &str = "vault.dat";

/// Subdirectory of the vault root holding ciphertext blobs.
pub const FILES_DIR: &str = "files";

/// The vault handle.  Open one with `VaultCore::open`, then ingest,
/// export, remove, and look up entries through it.
pub struct VaultCore {
    root: PathBuf,
    /// `root` with symlinks and `..` resolved, for containment checks.
    canonical_root: PathBuf,
    files_dir: PathBuf,
    store: EntryStore,
    index: Mutex<EntryIndex>,
    kdf_iterations: u32,
}

impl VaultCore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open (creating if needed) the vault rooted at `root` with the
    /// default PBKDF2 iteration count.
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_at(root, MIN_ITERATIONS)
    }

    /// Open the vault described by `settings`, relative to `project_dir`.
    pub fn open_with_settings(project_dir: &Path, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Self::open_at(&settings.vault_root(project_dir), settings.kdf_iterations)
    }

    fn open_at(root: &Path, kdf_iterations: u32) -> Result<Self> {
        if kdf_iterations < MIN_ITERATIONS {
            return Err(FileVaultError::InvalidInput(format!(
                "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {kdf_iterations})"
            )));
        }

        let files_dir = root.join(FILES_DIR);
        fs::create_dir_all(&files_dir)?;
        restrict_permissions(root);
        restrict_permissions(&files_dir);
        let canonical_root = fs::canonicalize(root)?;

        let store = EntryStore::new(root.join(SNAPSHOT_FILE));
        let index = store.load();

        Ok(Self {
            root: root.to_path_buf(),
            canonical_root,
            files_dir,
            store,
            index: Mutex::new(index),
            kdf_iterations,
        })
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Encrypt `source` into the vault and securely erase the original.
    ///
    /// Steps: derive a key from a fresh salt, seal the file contents,
    /// write the blob, append the entry, persist the index, and only then
    /// erase the source.  Returns the new entry id.
    ///
    /// - Source missing, not a regular file, or inside the vault root:
    ///   nothing happens (`InvalidInput`).
    /// - Blob write fails: nothing changes, source intact (`Io`).
    /// - Index save fails: the append is rolled back and the blob removed,
    ///   source intact (`PersistFailed`).
    /// - Erase fails: the entry is committed but the source may still hold
    ///   plaintext (`EraseFailed` carrying the new id).
    pub fn ingest(&self, source: &Path, password: Password) -> Result<String> {
        self.ingest_with(source, password, secure_erase)
    }

    fn ingest_with<E>(&self, source: &Path, password: Password, erase: E) -> Result<String>
    where
        E: FnOnce(&Path) -> Result<()>,
    {
        if password.is_empty() {
            return Err(FileVaultError::InvalidInput("password required".into()));
        }
        // Not following links: the erase at the end refuses them anyway.
        let meta = match fs::symlink_metadata(source) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileVaultError::InvalidInput(format!(
                    "file not found: {}",
                    source.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Err(FileVaultError::InvalidInput(format!(
                "not a regular file: {}",
                source.display()
            )));
        }
        // Erasing the snapshot or another entry's blob would corrupt the vault.
        if self.is_inside_vault(source)? {
            return Err(FileVaultError::InvalidInput(format!(
                "{} is inside the vault directory",
                source.display()
            )));
        }
        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // 1. Fresh salt and key; the password is wiped as soon as it is used.
        let salt = generate_salt();
        let key = derive_key_with_iterations(password.as_bytes(), &salt, self.kdf_iterations)?;
        drop(password);

        // 2. Seal the plaintext.
        let plaintext = Zeroizing::new(fs::read(source)?);
        let original_size = plaintext.len() as u64;
        let envelope = seal(&key, &plaintext)?;
        drop(key);
        drop(plaintext);

        // 3. Write the blob under a new id.
        let id = Uuid::new_v4().to_string();
        let ciphertext_ref = VaultEntry::ciphertext_ref_for(&id);
        let blob_path = self.files_dir.join(&ciphertext_ref);
        write_new_file(&blob_path, &envelope)?;

        // 4. Record and persist.
        let entry = VaultEntry {
            id: id.clone(),
            original_name,
            original_size,
            ciphertext_ref,
            created_at: Utc::now(),
            salt,
            kdf_iterations: self.kdf_iterations,
        };
        {
            let mut index = self.lock_index();
            let committed = index
                .push(entry)
                .and_then(|()| self.store.save(&index));
            if let Err(e) = committed {
                index.remove(&id);
                drop(index);
                discard_orphan(&blob_path);
                return Err(e);
            }
        }
        info!(id = %id, bytes = original_size, "ingested file");

        // 5. Only now is it safe to destroy the original.
        erase(source).map_err(|_| FileVaultError::EraseFailed {
            path: source.to_path_buf(),
            entry_id: Some(id.clone()),
        })?;

        Ok(id)
    }

    /// Decrypt an entry to `dest` and retire it from the vault.
    ///
    /// Export is consuming: once the plaintext is written, the blob is
    /// deleted and the entry removed.  A wrong password surfaces as
    /// `AuthFailure` and leaves the entry untouched, as does a failed
    /// write to `dest`.  An existing file at `dest` is replaced atomically,
    /// so it survives a failed write.  `dest` may not lie inside the vault
    /// root (`InvalidInput`).
    pub fn export(&self, identifier: &str, dest: &Path, password: Password) -> Result<VaultEntry> {
        if password.is_empty() {
            return Err(FileVaultError::InvalidInput("password required".into()));
        }
        if self.is_inside_vault(dest)? {
            return Err(FileVaultError::InvalidInput(format!(
                "{} is inside the vault directory",
                dest.display()
            )));
        }

        let mut index = self.lock_index();
        let entry = index
            .resolve(identifier)
            .cloned()
            .ok_or_else(|| FileVaultError::NotFound(identifier.to_string()))?;

        let key =
            derive_key_with_iterations(password.as_bytes(), &entry.salt, entry.kdf_iterations)?;
        drop(password);

        let envelope = fs::read(self.blob_path(&entry))?;
        let plaintext = Zeroizing::new(open(&key, &envelope)?);
        drop(key);

        write_atomic(dest, &plaintext)?;
        drop(plaintext);

        self.retire(&mut index, &entry)?;
        info!(id = %entry.id, "exported and retired entry");
        Ok(entry)
    }

    /// Delete an entry's blob and drop it from the index.
    ///
    /// A blob that is already gone counts as deleted.
    pub fn remove(&self, identifier: &str) -> Result<VaultEntry> {
        let mut index = self.lock_index();
        let entry = index
            .resolve(identifier)
            .cloned()
            .ok_or_else(|| FileVaultError::NotFound(identifier.to_string()))?;

        self.retire(&mut index, &entry)?;
        info!(id = %entry.id, "removed entry");
        Ok(entry)
    }

    /// Resolve an identifier (position, id, or id prefix) to an entry.
    pub fn lookup(&self, identifier: &str) -> Result<VaultEntry> {
        self.lock_index()
            .resolve(identifier)
            .cloned()
            .ok_or_else(|| FileVaultError::NotFound(identifier.to_string()))
    }

    /// Snapshot of all live entries in insertion order.
    pub fn list_entries(&self) -> Vec<VaultEntry> {
        self.lock_index().entries().to_vec()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding ciphertext blobs.
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Returns the path of the metadata snapshot.
    pub fn snapshot_path(&self) -> &Path {
        self.store.snapshot_path()
    }

    /// Full path of an entry's ciphertext blob.
    ///
    /// Always derived from the id, never from the stored `ciphertext_ref`.
    pub fn blob_path(&self, entry: &VaultEntry) -> PathBuf {
        self.files_dir.join(VaultEntry::ciphertext_ref_for(&entry.id))
    }

    /// Whether `path` resolves to a location under the vault root.
    ///
    /// Symlinks and `..` are resolved first.  A `path` that does not
    /// exist yet is judged by its parent directory, which must exist.
    pub fn is_inside_vault(&self, path: &Path) -> Result<bool> {
        Ok(canonical_target(path)?.starts_with(&self.canonical_root))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock_index(&self) -> MutexGuard<'_, EntryIndex> {
        // A panic mid-operation never leaves the Vec itself invalid.
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blob first, then the index entry, then the snapshot.
    fn retire(&self, index: &mut EntryIndex, entry: &VaultEntry) -> Result<()> {
        match fs::remove_file(self.blob_path(entry)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        index.remove(&entry.id);
        self.store.save(index)
    }
}

/// Write a file that must not already exist, synced to disk.  A partial
/// file is removed on failure.
fn write_new_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    restrict_permissions(path);

    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    if let Err(e) = written {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e.into());
    }
    Ok(())
}

fn canonical_target(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => return Ok(resolved),
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {}
    }

    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(name))
}

fn discard_orphan(blob_path: &Path) {
    if let Err(e) = fs::remove_file(blob_path) {
        warn!(
            path = %blob_path.display(),
            error = %e,
            "could not remove orphaned ciphertext blob"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn failing_erase(path: &Path) -> Result<()> {
        Err(FileVaultError::EraseFailed {
            path: path.to_path_buf(),
            entry_id: None,
        })
    }

    #[test]
    fn erase_failure_keeps_entry_live_and_reports_its_id() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vault_data");
        let vault = VaultCore::open(&root).unwrap();
        let src = dir.path().join("report.txt");
        fs::write(&src, b"quarterly numbers").unwrap();

        let err = vault
            .ingest_with(&src, Password::from("pw"), failing_erase)
            .unwrap_err();
        let id = match err {
            FileVaultError::EraseFailed {
                path,
                entry_id: Some(id),
            } => {
                assert_eq!(path, src);
                id
            }
            other => panic!("expected EraseFailed with an id, got {other:?}"),
        };

        // Committed before the erase ran: listed, persisted, and exportable.
        let entry = vault.lookup(&id).unwrap();
        assert!(vault.blob_path(&entry).exists());
        assert!(src.exists(), "source is left in place when erase fails");

        let reopened = VaultCore::open(&root).unwrap();
        assert_eq!(reopened.list_entries(), vec![entry]);

        let out = dir.path().join("restored.txt");
        reopened.export(&id, &out, Password::from("pw")).unwrap();
        assert_eq!(fs::read(&out).unwrap(), b"quarterly numbers");
    }

    #[test]
    fn erase_is_not_attempted_when_persist_fails() {
        let dir = TempDir::new().unwrap();
        let vault = VaultCore::open(&dir.path().join("vault_data")).unwrap();
        fs::create_dir(vault.snapshot_path()).unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"abc").unwrap();

        let result = vault.ingest_with(&src, Password::from("pw"), |_| {
            panic!("source must not be erased before the index is persisted")
        });

        assert!(matches!(result, Err(FileVaultError::PersistFailed(_))));
        assert!(src.exists());
    }

    #[test]
    fn blob_path_ignores_stored_ciphertext_ref() {
        let dir = TempDir::new().unwrap();
        let vault = VaultCore::open(&dir.path().join("vault_data")).unwrap();
        let entry = VaultEntry {
            id: "abc".into(),
            original_name: "a.txt".into(),
            original_size: 1,
            ciphertext_ref: "../../elsewhere.txt".into(),
            created_at: Utc::now(),
            salt: generate_salt(),
            kdf_iterations: MIN_ITERATIONS,
        };

        assert_eq!(vault.blob_path(&entry), vault.files_dir().join("abc.enc"));
    }

    #[test]
    fn canonical_target_resolves_missing_leaf_through_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();

        let target = canonical_target(&nested.join("..").join("sub").join("new.txt")).unwrap();
        assert_eq!(target, fs::canonicalize(&nested).unwrap().join("new.txt"));
    }
}
