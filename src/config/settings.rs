use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::MIN_ITERATIONS;
use crate::errors::{FileVaultError, Result};

/// Project-level configuration, loaded from `.filevault.toml`.
///
/// Every field has a sensible default so FileVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the snapshot and blobs.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// PBKDF2 iteration count for newly ingested files (minimum 100 000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    "vault_data".to_string()
}

fn default_kdf_iterations() -> u32 {
    MIN_ITERATIONS
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".filevault.toml";

    /// Load settings from `<project_dir>/.filevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or is out of range, an
    /// error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            FileVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the vault core would refuse later anyway.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_ITERATIONS {
            return Err(FileVaultError::ConfigError(format!(
                "kdf_iterations must be at least {MIN_ITERATIONS} (got {})",
                self.kdf_iterations
            )));
        }
        if self.vault_dir.trim().is_empty() {
            return Err(FileVaultError::ConfigError(
                "vault_dir cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Build the full path to the vault root directory.
    ///
    /// Example: `project_dir/vault_data`
    pub fn vault_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
