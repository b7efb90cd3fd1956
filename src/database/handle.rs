use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::DatabaseError;

/// A single row returned by [`Database::first`], keyed by column name
pub type Row = Map<String, Value>;

/// Value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Outcome of one executed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatementResult {
    /// Rows changed by the statement
    pub changes: u64,
    pub last_row_id: i64,
}

/// SQL text shared by every statement bound from it
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    sql: Arc<str>,
}

impl PreparedStatement {
    pub fn new(sql: &str) -> Self {
        Self { sql: Arc::from(sql) }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Pair the statement with positional parameters
    pub fn bind(&self, params: Vec<SqlValue>) -> BoundStatement {
        BoundStatement {
            sql: Arc::clone(&self.sql),
            params,
        }
    }
}

/// A statement ready to execute as part of a batch
#[derive(Debug, Clone)]
pub struct BoundStatement {
    sql: Arc<str>,
    params: Vec<SqlValue>,
}

impl BoundStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// Database handle injected into each request.
///
/// Every call is a round trip; implementations own their connection
/// handling. `batch` must be all-or-nothing.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a parameterized query and return its first row, if any
    async fn first(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DatabaseError>;

    /// Run a statement that returns no rows
    async fn run(&self, sql: &str) -> Result<StatementResult, DatabaseError>;

    /// Run every statement in one transaction, one result per statement
    async fn batch(&self, statements: Vec<BoundStatement>) -> Result<Vec<StatementResult>, DatabaseError>;
}
