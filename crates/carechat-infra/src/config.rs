//! Configuration loader for Carechat.
//!
//! Reads `carechat.toml` into [`CarechatConfig`] and takes its `[store]`
//! table, then applies `DB_*` environment overrides. Falls back to
//! sensible defaults when the file is missing or malformed.

use std::path::Path;

use secrecy::SecretString;
use tracing::{debug, warn};

use carechat_types::config::{CarechatConfig, StoreConfig};

/// Load store configuration from `path`, then apply environment overrides.
///
/// - If `path` is `None` or the file does not exist, starts from
///   [`StoreConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   starts from the default.
pub async fn load_store_config(path: Option<&Path>) -> StoreConfig {
    let config = match path {
        Some(path) => read_config_file(path).await,
        None => StoreConfig::default(),
    };
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

async fn read_config_file(path: &Path) -> StoreConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config file found at {}, using defaults", path.display());
            return StoreConfig::default();
        }
        Err(err) => {
            warn!("Failed to read {}: {err}, using defaults", path.display());
            return StoreConfig::default();
        }
    };

    match toml::from_str::<CarechatConfig>(&content) {
        Ok(file) => file.store,
        Err(err) => {
            warn!("Failed to parse {}: {err}, using defaults", path.display());
            StoreConfig::default()
        }
    }
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests need not mutate process state.
/// Numeric values that fail to parse are ignored with a warning.
pub fn apply_env_overrides<F>(mut config: StoreConfig, lookup: F) -> StoreConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("DB_HOST") {
        config.host = host;
    }
    if let Some(port) = parse_var(&lookup, "DB_PORT") {
        config.port = port;
    }
    if let Some(database) = lookup("DB_NAME") {
        config.database = database;
    }
    if let Some(user) = lookup("DB_USER") {
        config.user = user;
    }
    if let Some(password) = lookup("DB_PASSWORD") {
        config.password = Some(SecretString::from(password));
    }
    if let Some(max) = parse_var(&lookup, "DB_MAX_CONNECTIONS") {
        config.max_connections = max;
    }
    if let Some(ms) = parse_var(&lookup, "DB_IDLE_TIMEOUT_MS") {
        config.idle_timeout_ms = ms;
    }
    if let Some(ms) = parse_var(&lookup, "DB_CONNECT_TIMEOUT_MS") {
        config.connect_timeout_ms = ms;
    }
    if let Some(url) = lookup("CARECHAT_DATABASE_URL") {
        config.url = Some(url);
    }
    config
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
