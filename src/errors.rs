use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in FileVault.
#[derive(Debug, Error)]
pub enum FileVaultError {
    // --- Caller errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No vault entry matches '{0}'")]
    NotFound(String),

    // --- Crypto errors ---
    /// Wrong password, tampered ciphertext, and truncated envelopes all
    /// collapse into this one variant.
    #[error("Authentication failed — wrong password or corrupted data")]
    AuthFailure,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("Secure erase of {} failed — the file may still contain plaintext", .path.display())]
    EraseFailed {
        path: PathBuf,
        /// Set when the file was already ingested into the vault under this id.
        entry_id: Option<String>,
    },

    #[error("Failed to persist vault metadata: {0}")]
    PersistFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for FileVault results.
pub type Result<T> = std::result::Result<T, FileVaultError>;
