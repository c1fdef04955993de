//! Bounded connection pool for the chat log store.
//!
//! Built on sqlx's `Any` driver so the same store code runs against
//! PostgreSQL in production and a SQLite file for local runs and tests.
//! The backend is picked from the connection URL scheme.

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::debug;

use carechat_types::config::StoreConfig;
use carechat_types::error::{LifecycleError, StoreError};

/// SQL dialect behind a pool. Only the schema DDL differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Detect the backend from a connection URL.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            Err(StoreError::Connection(format!(
                "unsupported database url scheme '{scheme}'"
            )))
        }
    }
}

/// Open a pool from `config` and prove it works with a round-trip query.
///
/// Pool checkout waits at most `connect_timeout`, which also bounds the
/// initial connection attempt.
pub async fn connect(config: &StoreConfig) -> Result<(AnyPool, Backend), StoreError> {
    sqlx::any::install_default_drivers();

    let url = config
        .connection_url()
        .map_err(|e| StoreError::Connection(format!("invalid connection settings: {e}")))?;
    let backend = Backend::from_url(&url)?;

    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .idle_timeout(config.idle_timeout())
        .acquire_timeout(config.connect_timeout())
        .connect(&url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        pool.close().await;
        return Err(StoreError::Connection(e.to_string()));
    }

    debug!(backend = ?backend, "connectivity check passed");
    Ok((pool, backend))
}

/// Map a sqlx failure after initialization to the store taxonomy.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut => StoreError::PoolTimeout,
        sqlx::Error::PoolClosed => StoreError::Lifecycle(LifecycleError::Closed),
        other => StoreError::Storage(other.to_string()),
    }
}
