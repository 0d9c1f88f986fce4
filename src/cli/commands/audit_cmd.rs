//! `filevault audit` — show the history of adds, exports, and removals.
//!
//! ```text
//! filevault audit                       # last 50 events
//! filevault audit --entry 3f2a          # one entry's history
//! filevault audit --op export --failed  # failed exports (e.g. wrong passwords)
//! filevault audit --since 7d
//! ```

use chrono::{DateTime, Duration, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{AuditFilter, AuditLog, AuditOp, AuditRecord};
use crate::cli::output;
use crate::cli::{vault_root, Cli};
use crate::errors::{FileVaultError, Result};
use crate::vault::entry::format_size;

/// Options collected from the command line.
pub struct AuditArgs<'a> {
    pub last: usize,
    pub since: Option<&'a str>,
    pub entry: Option<&'a str>,
    pub op: Option<&'a str>,
    pub failed: bool,
}

/// Execute the `audit` command.
pub fn execute(cli: &Cli, args: &AuditArgs<'_>) -> Result<()> {
    let filter = build_filter(args)?;

    let audit = AuditLog::open(&vault_root(cli)?)
        .ok_or_else(|| FileVaultError::AuditError("failed to open audit database".into()))?;
    let records = audit.query(&filter)?;

    if records.is_empty() {
        output::info("No matching audit events.");
        return Ok(());
    }

    print_audit_table(&records);
    Ok(())
}

fn build_filter(args: &AuditArgs<'_>) -> Result<AuditFilter> {
    let op = match args.op {
        Some(name) => Some(AuditOp::parse(name).ok_or_else(|| {
            FileVaultError::CommandFailed(format!(
                "unknown operation '{name}' (expected add, export, or remove)"
            ))
        })?),
        None => None,
    };

    Ok(AuditFilter {
        limit: args.last,
        since: args.since.map(parse_since).transpose()?,
        entry_prefix: args.entry.map(str::to_string),
        op,
        failures_only: args.failed,
    })
}

/// Turn `30m`, `24h`, `7d`, or `2w` into the instant that long ago.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        FileVaultError::CommandFailed(format!(
            "invalid duration '{input}' (use e.g. 30m, 24h, 7d, 2w)"
        ))
    };

    let (split, _) = input.char_indices().last().ok_or_else(invalid)?;
    let (amount, unit) = input.split_at(split);
    let amount: i64 = amount.parse().map_err(|_| invalid())?;
    if amount < 0 {
        return Err(invalid());
    }

    let span = match unit {
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    }
    .ok_or_else(invalid)?;

    Utc::now().checked_sub_signed(span).ok_or_else(invalid)
}

fn print_audit_table(records: &[AuditRecord]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Entry", "Name", "Size", "Result"]);

    for record in records {
        table.add_row(vec![
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&record.operation),
            record
                .entry_id
                .as_deref()
                .map_or("-", output::short_id)
                .to_string(),
            record.file_name.clone().unwrap_or_else(|| "-".into()),
            record.file_size.map_or_else(|| "-".into(), format_size),
            outcome(record),
        ]);
    }

    let failures = records.iter().filter(|r| !r.succeeded()).count();
    let mut heading = format!("{} audit events", records.len());
    if failures > 0 {
        heading.push_str(&format!(", {failures} failed"));
    }
    println!("{}", style(heading).bold());
    println!("{table}");
}

fn colorize_operation(op: &str) -> String {
    match AuditOp::parse(op) {
        Some(AuditOp::Add) => style(op).green().to_string(),
        Some(AuditOp::Export) => style(op).cyan().to_string(),
        Some(AuditOp::Remove) => style(op).red().to_string(),
        None => op.to_string(),
    }
}

fn outcome(record: &AuditRecord) -> String {
    match &record.failure {
        None => style("ok").green().to_string(),
        Some(reason) => style(format!("failed: {reason}")).red().to_string(),
    }
}
