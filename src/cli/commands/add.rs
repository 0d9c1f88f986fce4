//! `filevault add` — encrypt a file into the vault.

use std::path::Path;

use crate::audit::{AuditEvent, AuditOp};
use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, record, Cli};
use crate::errors::{FileVaultError, Result};

/// Execute the `add` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let vault = open_vault(cli)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let password = prompt_new_password()?;

    match vault.ingest(file, password) {
        Ok(id) => {
            let event = match vault.lookup(&id) {
                Ok(entry) => AuditEvent::for_entry(AuditOp::Add, &entry),
                Err(_) => AuditEvent::new(AuditOp::Add).with_entry_id(&id),
            };
            record(vault.root(), &event);
            output::success(&format!("Encrypted '{name}' as {id}"));
            output::tip("The original file was securely erased.");
            Ok(())
        }
        Err(FileVaultError::EraseFailed {
            ref path,
            entry_id: Some(ref id),
        }) => {
            // The entry is live; only the original's removal failed.
            let event = match vault.lookup(id) {
                Ok(entry) => AuditEvent::for_entry(AuditOp::Add, &entry),
                Err(_) => AuditEvent::new(AuditOp::Add).with_entry_id(id.as_str()),
            };
            record(
                vault.root(),
                &event.failed("secure erase of the original failed"),
            );
            output::success(&format!("Encrypted '{name}' as {id}"));
            Err(FileVaultError::CommandFailed(format!(
                "could not securely erase {}; the original may still contain plaintext",
                path.display()
            )))
        }
        Err(e) => {
            record(
                vault.root(),
                &AuditEvent::new(AuditOp::Add).with_file_name(name).failed(&e),
            );
            Err(e)
        }
    }
}
