use axum::{
    extract::DefaultBodyLimit,
    http::header::{HeaderValue, InvalidHeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::{Database, SchemaEnsurer};
use crate::handlers;

/// Per-request context handed to every handler through router state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub schema: Arc<SchemaEnsurer>,
    pub cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, schema: SchemaEnsurer, cors_origin: HeaderValue) -> Self {
        Self {
            db,
            schema: Arc::new(schema),
            cors_origin,
        }
    }

    /// Build state from configuration; fails if the CORS origin is not a valid header value
    pub fn from_config(db: Arc<dyn Database>, config: &AppConfig) -> Result<Self, InvalidHeaderValue> {
        let cors_origin = HeaderValue::from_str(&config.security.cors_origin)?;
        Ok(Self::new(
            db,
            SchemaEnsurer::new(config.schema.memoize_check),
            cors_origin,
        ))
    }
}

pub fn app(state: AppState, max_request_size_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/save-data",
            post(handlers::save_data_post).options(handlers::save_data_options),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_request_size_bytes)),
        )
        .with_state(state)
}
