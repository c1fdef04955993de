//! Chat log store: pool lifecycle plus the `ChatLogRepository` implementation.
//!
//! The store moves through `Uninitialized -> Ready -> Closed`, with `Failed`
//! reachable from a bad `initialize` (which may be retried). Only `Ready`
//! accepts reads and appends; every other state fails fast with a
//! `LifecycleError`. `close()` is terminal and idempotent.
//!
//! Raw queries, with a private Row struct for row-to-domain mapping.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use carechat_core::chat_log::repository::ChatLogRepository;
use carechat_types::chat_log::{ChatLogEntry, NewChatLogEntry};
use carechat_types::config::StoreConfig;
use carechat_types::error::{LifecycleError, StoreError};

use super::pool::{self, Backend, map_sqlx_error};
use super::schema;

/// Columns returned by every read, normalized so both backends decode the
/// same Rust types.
const SELECT_COLUMNS: &str = r#"CAST(id AS BIGINT) AS id, session_id, healthcare_context,
    privacy_style, user_first_name, user_last_name, CAST(user_age AS BIGINT) AS user_age,
    user_input, bot_reply, CAST("timestamp" AS TEXT) AS "timestamp""#;

/// Observable lifecycle state of a [`ChatLogStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Uninitialized,
    Ready,
    Failed,
    Closed,
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::Uninitialized => write!(f, "uninitialized"),
            StoreStatus::Ready => write!(f, "ready"),
            StoreStatus::Failed => write!(f, "failed"),
            StoreStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Clone)]
struct ReadyPool {
    pool: AnyPool,
    backend: Backend,
    shutdown_timeout: Duration,
}

enum StoreState {
    Uninitialized,
    Failed,
    Ready(ReadyPool),
    Closed,
}

/// Append-only chat log over a bounded connection pool.
///
/// Construct one per process (or per test) and share it behind an `Arc`.
/// Operations check out a pooled connection, run one statement, and return
/// it; nothing holds a connection across calls.
pub struct ChatLogStore {
    state: RwLock<StoreState>,
    /// Serializes `initialize` and `close` so schema creation never races.
    lifecycle: Mutex<()>,
}

impl Default for ChatLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLogStore {
    /// Create an uninitialized store. No connections are opened yet.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::Uninitialized),
            lifecycle: Mutex::new(()),
        }
    }

    /// Open the pool, verify connectivity, and ensure the table exists.
    ///
    /// Calling this on a `Ready` store re-runs the idempotent schema check and
    /// keeps the existing pool. On failure the store is left `Failed` and the
    /// call may be retried. A `Closed` store cannot be reopened.
    pub async fn initialize(&self, config: &StoreConfig) -> Result<(), StoreError> {
        let _guard = self.lifecycle.lock().await;

        let existing = match &*self.state.read().await {
            StoreState::Closed => return Err(LifecycleError::Closed.into()),
            StoreState::Ready(ready) => Some(ready.clone()),
            StoreState::Uninitialized | StoreState::Failed => None,
        };
        if let Some(ready) = existing {
            debug!("chat log store already initialized, re-checking schema");
            return schema::ensure_schema(&ready.pool, ready.backend).await;
        }

        info!(
            db = %config.redacted_target(),
            max_connections = config.max_connections,
            "initializing chat log store"
        );

        match Self::open(config).await {
            Ok(ready) => {
                *self.state.write().await = StoreState::Ready(ready);
                info!("chat log store ready");
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = StoreState::Failed;
                error!("chat log store initialization failed: {e}");
                Err(e)
            }
        }
    }

    async fn open(config: &StoreConfig) -> Result<ReadyPool, StoreError> {
        let (pool, backend) = pool::connect(config).await?;
        if let Err(e) = schema::ensure_schema(&pool, backend).await {
            pool.close().await;
            return Err(e);
        }
        Ok(ReadyPool {
            pool,
            backend,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    /// The live pool. Fails fast unless the store is `Ready`.
    pub async fn pool(&self) -> Result<AnyPool, StoreError> {
        Ok(self.ready().await?.pool)
    }

    pub async fn status(&self) -> StoreStatus {
        match &*self.state.read().await {
            StoreState::Uninitialized => StoreStatus::Uninitialized,
            StoreState::Failed => StoreStatus::Failed,
            StoreState::Ready(_) => StoreStatus::Ready,
            StoreState::Closed => StoreStatus::Closed,
        }
    }

    /// Release all pooled connections and mark the store `Closed`.
    ///
    /// Waits for in-flight operations to hand back their connections, up to
    /// the configured shutdown timeout. Safe to call repeatedly and from any
    /// state; a store closed before initialization can never be initialized.
    pub async fn close(&self) {
        let _guard = self.lifecycle.lock().await;
        let previous = std::mem::replace(&mut *self.state.write().await, StoreState::Closed);

        match previous {
            StoreState::Ready(ready) => {
                info!("closing chat log store");
                match tokio::time::timeout(ready.shutdown_timeout, ready.pool.close()).await {
                    Ok(()) => info!("chat log store closed"),
                    Err(_) => warn!(
                        timeout_ms = ready.shutdown_timeout.as_millis() as u64,
                        "timed out draining chat log connections; closing anyway"
                    ),
                }
            }
            StoreState::Closed => debug!("chat log store already closed"),
            StoreState::Uninitialized | StoreState::Failed => {
                debug!("chat log store closed before it was ready")
            }
        }
    }

    async fn ready(&self) -> Result<ReadyPool, StoreError> {
        match &*self.state.read().await {
            StoreState::Ready(ready) => Ok(ready.clone()),
            StoreState::Closed => Err(LifecycleError::Closed.into()),
            StoreState::Uninitialized | StoreState::Failed => {
                Err(LifecycleError::NotInitialized.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for row-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatLogRow {
    id: i64,
    session_id: String,
    healthcare_context: String,
    privacy_style: String,
    user_first_name: Option<String>,
    user_last_name: Option<String>,
    user_age: Option<i64>,
    user_input: String,
    bot_reply: String,
    timestamp: String,
}

impl ChatLogRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            healthcare_context: row.try_get("healthcare_context")?,
            privacy_style: row.try_get("privacy_style")?,
            user_first_name: row.try_get("user_first_name")?,
            user_last_name: row.try_get("user_last_name")?,
            user_age: row.try_get("user_age")?,
            user_input: row.try_get("user_input")?,
            bot_reply: row.try_get("bot_reply")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_entry(self) -> Result<ChatLogEntry, StoreError> {
        let user_age = self
            .user_age
            .map(u32::try_from)
            .transpose()
            .map_err(|e| StoreError::Storage(format!("invalid user_age: {e}")))?;
        let timestamp = parse_timestamp(&self.timestamp)?;

        Ok(ChatLogEntry {
            id: self.id,
            session_id: self.session_id,
            healthcare_context: self.healthcare_context,
            privacy_style: self.privacy_style,
            user_first_name: self.user_first_name,
            user_last_name: self.user_last_name,
            user_age,
            user_input: self.user_input,
            bot_reply: self.bot_reply,
            timestamp,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// PostgreSQL renders fractional seconds, SQLite's CURRENT_TIMESTAMP does not.
fn parse_timestamp(s: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| StoreError::Storage(format!("invalid timestamp '{s}': {e}")))
}

fn rows_to_entries(rows: &[AnyRow]) -> Result<Vec<ChatLogEntry>, StoreError> {
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let log_row = ChatLogRow::from_row(row).map_err(map_sqlx_error)?;
        entries.push(log_row.into_entry()?);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// ChatLogRepository implementation
// ---------------------------------------------------------------------------

impl ChatLogRepository for ChatLogStore {
    async fn append(&self, entry: &NewChatLogEntry) -> Result<ChatLogEntry, StoreError> {
        let ready = self.ready().await?;

        let missing = entry.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::Validation(missing));
        }
        let user_age = entry
            .user_age
            .map(i32::try_from)
            .transpose()
            .map_err(|_| StoreError::Validation(vec!["user_age"]))?;

        let sql = format!(
            r#"INSERT INTO chat_logs (session_id, healthcare_context, privacy_style, user_first_name, user_last_name, user_age, user_input, bot_reply)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {SELECT_COLUMNS}"#
        );

        // A single statement: the row is committed whole or not at all.
        let row = sqlx::query(&sql)
            .bind(entry.session_id.as_str())
            .bind(entry.healthcare_context.as_str())
            .bind(entry.privacy_style.as_str())
            .bind(entry.user_first_name.as_deref())
            .bind(entry.user_last_name.as_deref())
            .bind(user_age)
            .bind(entry.user_input.as_str())
            .bind(entry.bot_reply.as_str())
            .fetch_one(&ready.pool)
            .await
            .map_err(map_sqlx_error)?;

        let saved = ChatLogRow::from_row(&row)
            .map_err(map_sqlx_error)?
            .into_entry()?;
        debug!(session_id = %saved.session_id, entry_id = saved.id, "chat log entry appended");
        Ok(saved)
    }

    async fn get(&self, id: i64) -> Result<Option<ChatLogEntry>, StoreError> {
        let ready = self.ready().await?;

        let sql = format!("SELECT {SELECT_COLUMNS} FROM chat_logs WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&ready.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let log_row = ChatLogRow::from_row(&row).map_err(map_sqlx_error)?;
                Ok(Some(log_row.into_entry()?))
            }
            None => Ok(None),
        }
    }

    async fn list_by_session(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ChatLogEntry>, StoreError> {
        let ready = self.ready().await?;

        let mut sql =
            format!("SELECT {SELECT_COLUMNS} FROM chat_logs WHERE session_id = $1 ORDER BY id ASC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        let rows = sqlx::query(&sql)
            .bind(session_id)
            .fetch_all(&ready.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows_to_entries(&rows)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let ready = self.ready().await?;

        let row = sqlx::query("SELECT CAST(COUNT(*) AS BIGINT) AS cnt FROM chat_logs")
            .fetch_one(&ready.pool)
            .await
            .map_err(map_sqlx_error)?;
        let count: i64 = row.try_get("cnt").map_err(map_sqlx_error)?;

        u64::try_from(count).map_err(|e| StoreError::Storage(format!("invalid count: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use carechat_types::registration::SessionContext;
    use tempfile::TempDir;

    use super::*;

    /// Store config over a fresh SQLite file; keep the `TempDir` alive.
    fn sqlite_config(max_connections: u32) -> (TempDir, StoreConfig) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("chat.db").display());
        let config = StoreConfig {
            max_connections,
            connect_timeout_ms: 10_000,
            ..StoreConfig::with_url(url)
        };
        (dir, config)
    }

    async fn ready_store() -> (TempDir, ChatLogStore) {
        let (dir, config) = sqlite_config(5);
        let store = ChatLogStore::new();
        store.initialize(&config).await.unwrap();
        (dir, store)
    }

    fn context() -> SessionContext {
        SessionContext {
            healthcare_context: "general".to_string(),
            privacy_style: "standard".to_string(),
        }
    }

    fn identified_entry(session_id: &str, input: &str) -> NewChatLogEntry {
        NewChatLogEntry {
            user_first_name: Some("Ada".to_string()),
            user_last_name: Some("Lovelace".to_string()),
            user_age: Some(35),
            ..NewChatLogEntry::anonymous(session_id, &context(), input, "Here is some information.")
        }
    }

    #[tokio::test]
    async fn test_new_store_is_uninitialized() {
        let store = ChatLogStore::new();
        assert_eq!(store.status().await, StoreStatus::Uninitialized);
        assert!(matches!(
            store.pool().await,
            Err(StoreError::Lifecycle(LifecycleError::NotInitialized))
        ));
    }

    #[tokio::test]
    async fn test_append_before_initialize_is_lifecycle_error() {
        let store = ChatLogStore::new();
        let err = store
            .append(&identified_entry("s1", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Lifecycle(LifecycleError::NotInitialized)
        ));
        assert!(matches!(
            store.get(1).await,
            Err(StoreError::Lifecycle(LifecycleError::NotInitialized))
        ));
    }

    #[tokio::test]
    async fn test_initialize_creates_table() {
        let (_dir, store) = ready_store().await;
        assert_eq!(store.status().await, StoreStatus::Ready);

        let pool = store.pool().await.unwrap();
        let row = sqlx::query(
            "SELECT CAST(COUNT(*) AS BIGINT) AS cnt FROM sqlite_master WHERE type = 'table' AND name = 'chat_logs'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let tables: i64 = row.try_get("cnt").unwrap();
        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn test_append_and_get_round_trip() {
        let (_dir, store) = ready_store().await;

        let new_entry = identified_entry("session-abc", "What are flu symptoms?");
        let saved = store.append(&new_entry).await.unwrap();
        assert!(saved.id > 0);

        let found = store.get(saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.session_id, "session-abc");
        assert_eq!(found.healthcare_context, "general");
        assert_eq!(found.privacy_style, "standard");
        assert_eq!(found.user_first_name.as_deref(), Some("Ada"));
        assert_eq!(found.user_last_name.as_deref(), Some("Lovelace"));
        assert_eq!(found.user_age, Some(35));
        assert_eq!(found.user_input, "What are flu symptoms?");
        assert_eq!(found.bot_reply, "Here is some information.");
    }

    #[tokio::test]
    async fn test_append_anonymous_entry() {
        let (_dir, store) = ready_store().await;

        let entry = NewChatLogEntry::anonymous("anon", &context(), "hi", "hello");
        let saved = store.append(&entry).await.unwrap();

        let found = store.get(saved.id).await.unwrap().unwrap();
        assert!(found.user_first_name.is_none());
        assert!(found.user_last_name.is_none());
        assert!(found.user_age.is_none());
    }

    #[tokio::test]
    async fn test_append_rejects_missing_required_fields() {
        let (_dir, store) = ready_store().await;

        let entry = NewChatLogEntry::anonymous("s1", &context(), "", " ");
        let err = store.append(&entry).await.unwrap_err();
        match err {
            StoreError::Validation(fields) => assert_eq!(fields, vec!["user_input", "bot_reply"]),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_entry_is_none() {
        let (_dir, store) = ready_store().await;
        assert!(store.get(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_list_by_session_in_order() {
        let (_dir, store) = ready_store().await;

        let first = store.append(&identified_entry("s1", "one")).await.unwrap();
        store.append(&identified_entry("s2", "elsewhere")).await.unwrap();
        let second = store.append(&identified_entry("s1", "two")).await.unwrap();
        assert!(second.id > first.id);

        let history = store.list_by_session("s1", None).await.unwrap();
        let inputs: Vec<&str> = history.iter().map(|e| e.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["one", "two"]);

        let capped = store.list_by_session("s1", Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].user_input, "one");

        assert!(store.list_by_session("nobody", None).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_initialize_twice_keeps_schema_and_rows() {
        let (_dir, config) = sqlite_config(5);
        let store = ChatLogStore::new();
        store.initialize(&config).await.unwrap();
        let saved = store.append(&identified_entry("s1", "kept")).await.unwrap();

        store.initialize(&config).await.unwrap();
        assert_eq!(store.status().await, StoreStatus::Ready);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(saved.id).await.unwrap().unwrap().user_input, "kept");
    }

    #[tokio::test]
    async fn test_schema_survives_a_second_store_on_the_same_database() {
        let (_dir, config) = sqlite_config(2);

        let first = ChatLogStore::new();
        first.initialize(&config).await.unwrap();
        first.append(&identified_entry("s1", "before restart")).await.unwrap();
        first.close().await;

        let second = ChatLogStore::new();
        second.initialize(&config).await.unwrap();
        let history = second.list_by_session("s1", None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_input, "before restart");
        second.close().await;
    }

    #[tokio::test]
    async fn test_initialize_failure_leaves_store_failed_and_retryable() {
        let bad = StoreConfig::with_url("mysql://localhost/caps");
        let store = ChatLogStore::new();
        let err = store.initialize(&bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
        assert_eq!(store.status().await, StoreStatus::Failed);
        assert!(matches!(
            store.append(&identified_entry("s1", "x")).await,
            Err(StoreError::Lifecycle(LifecycleError::NotInitialized))
        ));

        let (_dir, good) = sqlite_config(2);
        store.initialize(&good).await.unwrap();
        assert_eq!(store.status().await, StoreStatus::Ready);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (_dir, store) = ready_store().await;
        store.close().await;
        assert_eq!(store.status().await, StoreStatus::Closed);
        store.close().await;
        assert_eq!(store.status().await, StoreStatus::Closed);
    }

    #[tokio::test]
    async fn test_operations_after_close_fail_with_lifecycle_error() {
        let (_dir, config) = sqlite_config(2);
        let store = ChatLogStore::new();
        store.initialize(&config).await.unwrap();
        store.close().await;

        assert!(matches!(
            store.append(&identified_entry("s1", "late")).await,
            Err(StoreError::Lifecycle(LifecycleError::Closed))
        ));
        assert!(matches!(
            store.count().await,
            Err(StoreError::Lifecycle(LifecycleError::Closed))
        ));
        assert!(matches!(
            store.initialize(&config).await,
            Err(StoreError::Lifecycle(LifecycleError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_close_before_initialize_is_ok() {
        let store = ChatLogStore::new();
        store.close().await;
        assert_eq!(store.status().await, StoreStatus::Closed);
    }

    #[tokio::test]
    async fn test_exhausted_pool_times_out_and_close_stays_bounded() {
        let (_dir, config) = sqlite_config(1);
        let config = StoreConfig {
            connect_timeout_ms: 300,
            shutdown_timeout_ms: 300,
            ..config
        };
        let store = ChatLogStore::new();
        store.initialize(&config).await.unwrap();

        let pool = store.pool().await.unwrap();
        let _held = pool.acquire().await.unwrap();

        let err = store
            .append(&identified_entry("starved", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PoolTimeout), "got {err:?}");

        let started = std::time::Instant::now();
        store.close().await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(store.status().await, StoreStatus::Closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_against_small_pool() {
        let (_dir, store) = ready_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::with_capacity(100);
        for i in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let entry = identified_entry(&format!("session-{i}"), &format!("message {i}"));
                store.append(&entry).await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let saved = handle.await.unwrap().unwrap();
            assert!(ids.insert(saved.id), "duplicate id {}", saved.id);
        }

        assert_eq!(ids.len(), 100);
        assert_eq!(store.count().await.unwrap(), 100);
        for i in 0..100 {
            let history = store.list_by_session(&format!("session-{i}"), None).await.unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].user_input, format!("message {i}"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_close_while_appends_in_flight_never_half_writes() {
        let (dir, store) = ready_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append(&identified_entry("racing", &format!("message {i}")))
                    .await
            }));
        }
        store.close().await;

        let mut committed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(StoreError::Lifecycle(LifecycleError::Closed)) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(committed <= 20);

        // Reopen the same file to check that every committed row is complete.
        let reopened = ChatLogStore::new();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("chat.db").display());
        reopened.initialize(&StoreConfig::with_url(url)).await.unwrap();
        let rows = reopened.list_by_session("racing", None).await.unwrap();
        assert_eq!(rows.len(), committed);
        for row in rows {
            assert!(row.user_input.starts_with("message "));
            assert_eq!(row.bot_reply, "Here is some information.");
        }
        reopened.close().await;
    }

    #[test]
    fn test_parse_timestamp_both_dialects() {
        let sqlite = parse_timestamp("2026-10-17 09:30:00").unwrap();
        let postgres = parse_timestamp("2026-10-17 09:30:00.123456").unwrap();
        assert_eq!(sqlite.format("%H:%M:%S").to_string(), "09:30:00");
        assert_eq!(postgres.and_utc().timestamp_subsec_micros(), 123_456);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
