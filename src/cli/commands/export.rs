//! `filevault export` — decrypt an entry and retire it from the vault.

use std::path::Path;

use crate::audit::{AuditEvent, AuditOp};
use crate::cli::output;
use crate::cli::{open_vault, prompt_password, record, Cli};
use crate::errors::{FileVaultError, Result};

/// Execute the `export` command.
pub fn execute(cli: &Cli, id: &str, dest: &Path) -> Result<()> {
    let vault = open_vault(cli)?;
    let dest = std::env::current_dir()?.join(dest);

    // Resolve first so a typo fails before the password prompt.
    let entry = vault.lookup(id)?;

    if vault.is_inside_vault(&dest)? {
        return Err(FileVaultError::CommandFailed(format!(
            "refusing to export into the vault directory ({})",
            dest.display()
        )));
    }

    let password = prompt_password()?;
    let exported = match vault.export(&entry.id, &dest, password) {
        Ok(exported) => exported,
        Err(e) => {
            record(
                vault.root(),
                &AuditEvent::for_entry(AuditOp::Export, &entry).failed(&e),
            );
            return Err(e);
        }
    };

    record(vault.root(), &AuditEvent::for_entry(AuditOp::Export, &exported));
    output::success(&format!(
        "Decrypted '{}' to {}",
        exported.original_name,
        dest.display()
    ));
    output::tip("The entry has been removed from the vault.");

    Ok(())
}
