//! Chat log store configuration.
//!
//! `StoreConfig` describes how to reach the relational store and how the
//! connection pool behaves. Every field has a default so a local PostgreSQL
//! with the stock `postgres` role works with no configuration at all.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;

/// Top-level shape of `carechat.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct CarechatConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

/// Connection and pool settings for the chat log store.
///
/// Loaded from the `[store]` table of `carechat.toml`; see
/// `carechat_infra::config` for file and environment loading.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_user")]
    pub user: String,

    /// Never logged; `Debug` output is redacted.
    #[serde(default, deserialize_with = "deserialize_password")]
    pub password: Option<SecretString>,

    /// Upper bound on live pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Idle connections older than this are evicted.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// How long to wait for a connection, both at startup and when the pool
    /// is exhausted.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Bound on how long `close()` waits for in-flight operations.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Full connection URL. When set it wins over the discrete keys above,
    /// and is the only way to select a SQLite file.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "caps".to_string()
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_idle_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_shutdown_timeout_ms() -> u64 {
    5_000
}

fn deserialize_password<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(SecretString::from))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            user: default_user(),
            password: None,
            max_connections: default_max_connections(),
            idle_timeout_ms: default_idle_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            url: None,
        }
    }
}

impl StoreConfig {
    /// Config pointing at an explicit connection URL, other keys defaulted.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// The URL the pool connects to.
    ///
    /// Uses `url` verbatim when set; otherwise assembles a `postgres://` URL
    /// from the discrete keys, percent-encoding the credentials.
    pub fn connection_url(&self) -> Result<String, url::ParseError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let mut url = Url::parse(&format!("postgres://{}", self.host))?;
        // These setters only fail for cannot-be-a-base URLs, which a
        // `postgres://host` URL never is.
        let _ = url.set_port(Some(self.port));
        let _ = url.set_username(&self.user);
        if let Some(password) = &self.password {
            let _ = url.set_password(Some(password.expose_secret()));
        }
        url.set_path(&format!("/{}", self.database));
        Ok(url.to_string())
    }

    /// Connection target with credentials stripped, safe for logs.
    pub fn redacted_target(&self) -> String {
        match &self.url {
            Some(url) => match Url::parse(url) {
                Ok(mut parsed) => {
                    let _ = parsed.set_password(None);
                    parsed.to_string()
                }
                Err(_) => "<unparseable url>".to_string(),
            },
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
        }
    }
}
