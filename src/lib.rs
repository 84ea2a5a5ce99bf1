pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod paging;
pub mod store;
pub mod tree;

use anyhow::Result;
use axum::{extract::DefaultBodyLimit, extract::State, routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::Database;
use crate::engine::Engine;
use crate::store::{MemoryStore, Store};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            engine: Engine::new(store),
            config: Arc::new(config),
        }
    }
}

/// Open the configured store, applying migrations for Postgres
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    if config.database.is_memory() {
        tracing::warn!("Using in-memory store - data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    // Connect to database with production settings
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;

    tracing::info!(
        "Database pool: max={}, min={} connections",
        config.database.max_connections,
        config.database.min_connections
    );

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed successfully");

    Ok(Arc::new(Database::new(pool)))
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors_origins);
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .route("/health", get(health_check))
        // Ready check (includes a store round trip)
        .route("/ready", get(ready_check))
        .nest("/api", api::router())
        // Middleware layers (order matters - applied bottom to top)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    let store = connect(&config).await?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(store, config);

    tracing::info!(
        "Max body size: {} bytes, default page size: {}",
        state.config.server.max_body_size,
        state.config.paging.default_limit
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("forumdb listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Readiness check - verifies the store answers
async fn ready_check(State(state): State<AppState>) -> Result<&'static str, &'static str> {
    match state.engine.status().await {
        Ok(_) => Ok("ready"),
        Err(_) => Err("store unavailable"),
    }
}

/// Build CORS layer from configuration
fn build_cors_layer(origins: &str) -> CorsLayer {
    if origins == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;

        let origins: Vec<_> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
