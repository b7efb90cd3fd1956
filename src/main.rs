use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use scan_data_api::config::{self, AppConfig};
use scan_data_api::database::{DatabaseManager, SqliteDatabase};
use scan_data_api::server::{self, AppState};

#[derive(Parser)]
#[command(name = "scan-data-api")]
#[command(about = "Stores batches of barcode scans in SQLite")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides API_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides API_BIND_ADDRESS)")]
    bind: Option<String>,

    #[arg(long, help = "SQLite URL, e.g. sqlite://scan_data.db (overrides DATABASE_URL)")]
    database_url: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(bind) = self.bind {
            config.api.bind_address = bind;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_CORS_ORIGIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = config::config().clone();
    Cli::parse().apply(&mut config);
    tracing::info!("Starting scan data API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open database")?;
    let db = Arc::new(SqliteDatabase::new(pool.clone()));
    let state = AppState::from_config(db, &config).context("invalid SECURITY_CORS_ORIGIN")?;
    let app = server::app(state, config.api.max_request_size_bytes);

    let bind_addr = format!("{}:{}", config.api.bind_address, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
