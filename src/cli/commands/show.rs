//! `filevault show` — print one entry's metadata.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    let entry = vault.lookup(id)?;
    output::print_entry_details(&entry);
    Ok(())
}
