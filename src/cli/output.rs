//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::VaultEntry;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (#, Id, Name, Size, Added).
///
/// The `#` column is the position accepted as an identifier this session.
pub fn print_entries_table(entries: &[VaultEntry]) {
    if entries.is_empty() {
        info("The vault is empty.");
        tip("Run `filevault add <FILE>` to encrypt your first file.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Id", "Name", "Size", "Added"]);

    for (position, e) in entries.iter().enumerate() {
        table.add_row(vec![
            position.to_string(),
            short_id(&e.id).to_string(),
            e.original_name.clone(),
            e.formatted_size(),
            e.formatted_time(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one entry except the salt.
pub fn print_entry_details(entry: &VaultEntry) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Id".to_string(), entry.id.clone()]);
    table.add_row(vec!["Name".to_string(), entry.original_name.clone()]);
    table.add_row(vec![
        "Size".to_string(),
        format!("{} ({} bytes)", entry.formatted_size(), entry.original_size),
    ]);
    table.add_row(vec!["Added".to_string(), entry.formatted_time()]);
    table.add_row(vec!["Blob".to_string(), entry.ciphertext_ref.clone()]);
    table.add_row(vec![
        "KDF".to_string(),
        format!("PBKDF2-HMAC-SHA256, {} iterations", entry.kdf_iterations),
    ]);
    println!("{table}");
}

/// First eight characters of an id, enough to use as a prefix.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
