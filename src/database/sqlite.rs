use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteQueryResult, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::handle::{BoundStatement, Database, Row, SqlValue, StatementResult};
use super::DatabaseError;

/// [`Database`] backed by a sqlx SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn first(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DatabaseError> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_json).transpose()
    }

    async fn run(&self, sql: &str) -> Result<StatementResult, DatabaseError> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(statement_result(&result))
    }

    async fn batch(&self, statements: Vec<BoundStatement>) -> Result<Vec<StatementResult>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(statements.len());

        // Dropping `tx` on an early return rolls back everything before it
        for statement in &statements {
            let result = bind_params(sqlx::query(statement.sql()), statement.params())
                .execute(&mut *tx)
                .await?;
            results.push(statement_result(&result));
        }

        tx.commit().await?;
        Ok(results)
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn statement_result(result: &SqliteQueryResult) -> StatementResult {
    StatementResult {
        changes: result.rows_affected(),
        last_row_id: result.last_insert_rowid(),
    }
}

/// Decode a row by the storage class of each value rather than its declared type
fn row_to_json(row: &SqliteRow) -> Result<Row, DatabaseError> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let (is_null, storage) = {
            let raw = row.try_get_raw(idx)?;
            (raw.is_null(), raw.type_info().name().to_string())
        };

        let value = if is_null {
            Value::Null
        } else {
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => json!(row.try_get_unchecked::<i64, _>(idx)?),
                "REAL" => json!(row.try_get_unchecked::<f64, _>(idx)?),
                "BLOB" => json!(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
                _ => json!(row.try_get_unchecked::<String, _>(idx)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}
