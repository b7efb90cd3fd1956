use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

use super::handle::{Database, SqlValue};
use super::DatabaseError;

pub const TABLE_NAME: &str = "scan_data";

const TABLE_EXISTS_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table' AND name=?";

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS scan_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sequence INTEGER NOT NULL,
    barcode_text TEXT NOT NULL,
    scan_timestamp TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_INDEX_SQL: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_scan_timestamp ON scan_data(scan_timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_created_at ON scan_data(created_at)",
];

/// What [`SchemaEnsurer::ensure`] found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// Table was already in the catalog
    Present,
    /// Table and indexes were created by this call
    Created,
    /// An earlier call already confirmed the table; no query was issued
    Cached,
}

/// Creates the `scan_data` table and its indexes the first time they are needed.
///
/// Every DDL statement carries `IF NOT EXISTS`, so two requests that both
/// miss the table can both run creation safely.
#[derive(Debug, Default)]
pub struct SchemaEnsurer {
    memoize: bool,
    ensured: AtomicBool,
}

impl SchemaEnsurer {
    /// With `memoize` set, the catalog lookup is skipped after the first success
    pub fn new(memoize: bool) -> Self {
        Self {
            memoize,
            ensured: AtomicBool::new(false),
        }
    }

    pub async fn ensure(&self, db: &dyn Database) -> Result<SchemaOutcome, DatabaseError> {
        if self.memoize && self.ensured.load(Ordering::Acquire) {
            return Ok(SchemaOutcome::Cached);
        }

        let outcome = Self::check_and_create(db).await.map_err(|e| {
            error!(error = %e, table = TABLE_NAME, "failed to ensure table");
            e
        })?;

        if self.memoize {
            self.ensured.store(true, Ordering::Release);
        }
        Ok(outcome)
    }

    async fn check_and_create(db: &dyn Database) -> Result<SchemaOutcome, DatabaseError> {
        let existing = db
            .first(TABLE_EXISTS_SQL, &[SqlValue::Text(TABLE_NAME.to_string())])
            .await?;
        if existing.is_some() {
            return Ok(SchemaOutcome::Present);
        }

        db.run(CREATE_TABLE_SQL).await?;
        for sql in CREATE_INDEX_SQL {
            db.run(sql).await?;
        }

        info!(table = TABLE_NAME, "created table and indexes");
        Ok(SchemaOutcome::Created)
    }
}
