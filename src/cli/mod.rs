//! CLI module — Clap argument parser, output helpers, and command implementations.
//!
//! The CLI only collects paths and passwords; every vault rule lives in
//! `crate::vault::VaultCore`.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;

use zeroize::Zeroizing;

use crate::audit::AuditEvent;
use crate::config::Settings;
use crate::crypto::Password;
use crate::errors::{FileVaultError, Result};
use crate::vault::VaultCore;

/// Environment variable consulted before prompting for a password.
pub const PASSWORD_ENV: &str = "FILEVAULT_PASSWORD";

/// Minimum password length when choosing a new password.
const MIN_PASSWORD_LEN: usize = 8;

/// FileVault CLI: per-file password encrypted vault.
#[derive(Parser)]
#[command(
    name = "filevault",
    about = "Encrypted file vault with per-file passwords",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: from .filevault.toml, else vault_data)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt a file into the vault and securely erase the original
    Add {
        /// File to encrypt
        file: PathBuf,
    },

    /// Decrypt an entry to a file and remove it from the vault
    Export {
        /// Entry position, id, or id prefix
        id: String,
        /// Where to write the decrypted file
        output: PathBuf,
    },

    /// Delete an entry without decrypting it
    Remove {
        /// Entry position, id, or id prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List all entries
    List,

    /// Show the metadata of one entry
    Show {
        /// Entry position, id, or id prefix
        id: String,
    },

    /// Show the history of adds, exports, and removals
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of events to show
        #[arg(long, default_value = "50")]
        last: usize,
        /// Only events newer than this (e.g. 30m, 24h, 7d, 2w)
        #[arg(long)]
        since: Option<String>,
        /// Only events for entries whose id starts with this
        #[arg(long)]
        entry: Option<String>,
        /// Only this operation (add, export, remove)
        #[arg(long)]
        op: Option<String>,
        /// Only failed operations
        #[arg(long)]
        failed: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the password for an existing entry, trying in order:
/// 1. `FILEVAULT_PASSWORD` env var (scripting)
/// 2. Interactive prompt
pub fn prompt_password() -> Result<Password> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter file password")
        .interact()
        .map_err(|e| FileVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Password::from(Zeroizing::new(pw)))
}

/// Prompt for a new password with confirmation (used by `add`).
///
/// Also respects `FILEVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Password> {
    if let Some(pw) = password_from_env() {
        if pw.as_bytes().len() < MIN_PASSWORD_LEN {
            return Err(FileVaultError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose a password for this file")
                .with_confirmation("Confirm password", "Passwords do not match, try again")
                .interact()
                .map_err(|e| FileVaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Password::from(password));
    }
}

fn password_from_env() -> Option<Password> {
    let pw = Zeroizing::new(std::env::var(PASSWORD_ENV).ok()?);
    if pw.is_empty() {
        return None;
    }
    Some(Password::from(pw))
}

/// Resolve the vault root from `--vault-dir` or the project settings.
pub fn vault_root(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    match &cli.vault_dir {
        Some(dir) => Ok(cwd.join(dir)),
        None => Ok(Settings::load(&cwd)?.vault_root(&cwd)),
    }
}

/// Open the vault the CLI arguments point at.
pub fn open_vault(cli: &Cli) -> Result<VaultCore> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir.clone_from(dir);
    }
    VaultCore::open_with_settings(&cwd, &settings)
}

/// Record an event in the vault's audit log when the feature is enabled.
pub fn record(vault_root: &Path, event: &AuditEvent) {
    #[cfg(feature = "audit-log")]
    crate::audit::log_event(vault_root, event);

    #[cfg(not(feature = "audit-log"))]
    let _ = (vault_root, event);
}
