#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use reqwest::StatusCode;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use scan_data_api::config::DatabaseConfig;
use scan_data_api::database::{DatabaseManager, SchemaEnsurer, SqliteDatabase};
use scan_data_api::server::{self, AppState};

/// Row of `scan_data`: (id, sequence, barcode_text, scan_timestamp, created_at)
pub type StoredScan = (i64, i64, String, String, String);

/// Request body limit the test router is built with
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// The app served on a free local port over its own database
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub pool: SqlitePool,
    task: JoinHandle<()>,
    // Keeps a file database alive for the server's lifetime
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(false, "*").await
    }

    pub async fn spawn_with(memoize_schema: bool, cors_origin: &'static str) -> Result<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
            busy_timeout_ms: 1_000,
        };
        Self::spawn_on(config, None, memoize_schema, cors_origin).await
    }

    /// Serve over a fresh SQLite file with a pool of `max_connections`
    pub async fn spawn_file_backed(max_connections: u32) -> Result<Self> {
        let temp_dir = TempDir::new().context("failed to create temp dir")?;
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("scan_data.db").display()),
            max_connections,
            connection_timeout: 10,
            busy_timeout_ms: 5_000,
        };
        Self::spawn_on(config, Some(temp_dir), false, "*").await
    }

    async fn spawn_on(
        config: DatabaseConfig,
        temp_dir: Option<TempDir>,
        memoize_schema: bool,
        cors_origin: &'static str,
    ) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let pool = DatabaseManager::connect(&config)
            .await
            .with_context(|| format!("failed to open {}", config.url))?;

        let state = AppState::new(
            Arc::new(SqliteDatabase::new(pool.clone())),
            SchemaEnsurer::new(memoize_schema),
            HeaderValue::from_static(cors_origin),
        );
        let app = server::app(state, BODY_LIMIT_BYTES);

        // Bound before returning, so requests queue until the server task runs
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url,
            pool,
            task,
            _temp_dir: temp_dir,
        })
    }

    pub fn save_url(&self) -> String {
        format!("{}/save-data", self.base_url)
    }

    pub async fn post_json(&self, body: &Value) -> Result<(StatusCode, Value)> {
        let res = reqwest::Client::new()
            .post(self.save_url())
            .json(body)
            .send()
            .await?;
        let status = res.status();
        Ok((status, res.json::<Value>().await?))
    }

    pub async fn rows(&self) -> Result<Vec<StoredScan>> {
        let rows = sqlx::query_as::<_, StoredScan>(
            "SELECT id, sequence, barcode_text, scan_timestamp, CAST(created_at AS TEXT) \
             FROM scan_data ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Number of catalog entries of `kind` ('table' or 'index') attached to scan_data
    pub async fn catalog_count(&self, kind: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ? AND tbl_name = 'scan_data'",
        )
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn scan(sequence: i64, text: &str, timestamp: &str) -> Value {
    serde_json::json!({ "sequence": sequence, "text": text, "timestamp": timestamp })
}
