//! `filevault remove` — delete an entry without decrypting it.

use dialoguer::Confirm;

use crate::audit::{AuditEvent, AuditOp};
use crate::cli::output;
use crate::cli::{open_vault, record, Cli};
use crate::errors::{FileVaultError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let entry = vault.lookup(id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete '{}' ({})?",
                entry.original_name, entry.id
            ))
            .default(false)
            .interact()
            .map_err(|e| FileVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let removed = match vault.remove(&entry.id) {
        Ok(removed) => removed,
        Err(e) => {
            record(
                vault.root(),
                &AuditEvent::for_entry(AuditOp::Remove, &entry).failed(&e),
            );
            return Err(e);
        }
    };

    record(vault.root(), &AuditEvent::for_entry(AuditOp::Remove, &removed));
    output::success(&format!("Removed '{}'", removed.original_name));

    Ok(())
}
