//! SQLite storage for audit events at `<vault_root>/audit.db`.
//!
//! Writing is fire-and-forget: if the database can't be opened or
//! written to, vault operations carry on unrecorded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use super::event::{AuditEvent, AuditOp};
use crate::errors::{FileVaultError, Result};

const DB_FILE: &str = "audit.db";

const COLUMNS: &str = "id, timestamp, operation, entry_id, file_name, file_size, failure";

/// A stored audit event as read back from the database.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Raw operation name; unknown names from newer versions are kept.
    pub operation: String,
    pub entry_id: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub failure: Option<String>,
}

impl AuditRecord {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let ts: String = row.get(1)?;
        let timestamp = DateTime::parse_from_rfc3339(&ts)
            .map_or(DateTime::<Utc>::MIN_UTC, |dt| dt.with_timezone(&Utc));
        let file_size: Option<i64> = row.get(5)?;

        Ok(Self {
            id: row.get(0)?,
            timestamp,
            operation: row.get(2)?,
            entry_id: row.get(3)?,
            file_name: row.get(4)?,
            file_size: file_size.and_then(|s| u64::try_from(s).ok()),
            failure: row.get(6)?,
        })
    }
}

/// Which records `AuditLog::query` returns.  Most recent first.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub limit: usize,
    pub since: Option<DateTime<Utc>>,
    /// Only events whose entry id starts with this.
    pub entry_prefix: Option<String>,
    pub op: Option<AuditOp>,
    pub failures_only: bool,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self {
            limit: 50,
            since: None,
            entry_prefix: None,
            op: None,
            failures_only: false,
        }
    }
}

impl AuditFilter {
    /// Build the WHERE clause and its positional parameters.
    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(since) = self.since {
            clauses.push("timestamp >= ?");
            values.push(Value::Text(since.to_rfc3339()));
        }
        if let Some(prefix) = self.entry_prefix.as_deref().map(str::trim) {
            if !prefix.is_empty() {
                clauses.push("entry_id LIKE ? ESCAPE '\\'");
                values.push(Value::Text(format!("{}%", escape_like(prefix))));
            }
        }
        if let Some(op) = self.op {
            clauses.push("operation = ?");
            values.push(Value::Text(op.as_str().to_string()));
        }
        if self.failures_only {
            clauses.push("failure IS NOT NULL");
        }

        let mut sql = format!("SELECT {COLUMNS} FROM audit_log");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC LIMIT ?");
        values.push(Value::Integer(
            i64::try_from(self.limit).unwrap_or(i64::MAX),
        ));
        (sql, values)
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database inside `vault_root`.
    ///
    /// Returns `None` when the database is unavailable.
    pub fn open(vault_root: &Path) -> Option<Self> {
        let db_path = Self::db_path(vault_root);
        let conn = Connection::open(&db_path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&db_path, std::fs::Permissions::from_mode(0o600));
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                entry_id    TEXT,
                file_name   TEXT,
                file_size   INTEGER,
                failure     TEXT
            );
            CREATE INDEX IF NOT EXISTS audit_log_entry ON audit_log (entry_id);",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Append one event.  Errors are logged and otherwise ignored.
    pub fn record(&self, event: &AuditEvent) {
        let size = event.file_size.and_then(|s| i64::try_from(s).ok());
        let written = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, entry_id, file_name, file_size, failure)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Utc::now().to_rfc3339(),
                event.op.as_str(),
                event.entry_id,
                event.file_name,
                size,
                event.failure,
            ],
        );
        if let Err(e) = written {
            debug!(error = %e, op = %event.op, "could not write audit record");
        }
    }

    /// Records matching `filter`, most recent first.
    pub fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>> {
        let (sql, values) = filter.to_sql();

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| FileVaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(params_from_iter(values.iter()), AuditRecord::from_row)
            .map_err(|e| FileVaultError::AuditError(format!("query exec: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| FileVaultError::AuditError(format!("row parse: {e}")))
    }

    pub fn db_path(vault_root: &Path) -> PathBuf {
        vault_root.join(DB_FILE)
    }
}

/// Open the vault's audit log and append `event`, ignoring any failure.
pub fn log_event(vault_root: &Path, event: &AuditEvent) {
    if let Some(audit) = AuditLog::open(vault_root) {
        audit.record(event);
    }
}
