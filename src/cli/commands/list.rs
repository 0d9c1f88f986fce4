//! `filevault list` — display all entries in a table.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    let entries = vault.list_entries();

    output::info(&format!(
        "{} — {} file(s)",
        vault.root().display(),
        entries.len()
    ));
    output::print_entries_table(&entries);

    Ok(())
}
