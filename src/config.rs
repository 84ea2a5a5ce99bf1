use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paging::DEFAULT_LIMIT;

/// `DATABASE_URL` value that selects the in-process store
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 16MB, post batches can be large)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Allowed CORS origins (comma-separated, or "*" for any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL, or `memory` for the in-process store
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum idle connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagingConfig {
    /// Page size when a listing has no usable `limit`
    #[serde(default = "default_page_limit")]
    pub default_limit: i64,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_max_body_size() -> usize { 16 * 1024 * 1024 } // 16MB
fn default_cors_origins() -> String { "*".to_string() }
fn default_max_connections() -> u32 { 100 }
fn default_min_connections() -> u32 { 10 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_page_limit() -> i64 { DEFAULT_LIMIT }

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_port),
                max_body_size: std::env::var("MAX_BODY_SIZE")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_max_body_size),
                cors_origins: std::env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| default_cors_origins()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_min_connections),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_connect_timeout),
                idle_timeout_secs: std::env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_idle_timeout),
            },
            paging: PagingConfig {
                default_limit: std::env::var("DEFAULT_PAGE_LIMIT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .filter(|l: &i64| *l > 0)
                    .unwrap_or_else(default_page_limit),
            },
        })
    }

    /// In-memory configuration with defaults, for tests and local runs
    pub fn in_memory() -> Self {
        Config {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                max_body_size: default_max_body_size(),
                cors_origins: default_cors_origins(),
            },
            database: DatabaseConfig {
                url: MEMORY_DATABASE_URL.to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            paging: PagingConfig {
                default_limit: default_page_limit(),
            },
        }
    }
}
