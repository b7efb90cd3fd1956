use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the SQLite connection pool the server hands to every request
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for `config.url`.
    ///
    /// File databases are created on demand and run in WAL mode. In-memory
    /// databases live only as long as a connection does, so they are pinned
    /// to one connection that never idles out.
    pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
        let in_memory = Self::is_in_memory(&config.url);

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DatabaseError::InvalidDatabaseUrl(format!("{}: {}", config.url, e)))?
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        if !in_memory {
            options = options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options =
            SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.connection_timeout));
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;

        info!("Opened database pool for: {}", config.url);
        Ok(pool)
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
