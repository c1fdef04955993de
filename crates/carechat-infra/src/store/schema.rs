//! `chat_logs` table DDL.
//!
//! Every statement is create-if-absent, so running it against an existing
//! database never drops or alters rows.

use sqlx::AnyPool;
use tracing::debug;

use carechat_types::error::StoreError;

use super::pool::Backend;

const POSTGRES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS chat_logs (
    id SERIAL PRIMARY KEY,
    session_id VARCHAR(255) NOT NULL,
    healthcare_context VARCHAR(100) NOT NULL,
    privacy_style VARCHAR(50) NOT NULL,
    user_first_name VARCHAR(100),
    user_last_name VARCHAR(100),
    user_age INTEGER,
    user_input TEXT NOT NULL,
    bot_reply TEXT NOT NULL,
    "timestamp" TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

const SQLITE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS chat_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id VARCHAR(255) NOT NULL,
    healthcare_context VARCHAR(100) NOT NULL,
    privacy_style VARCHAR(50) NOT NULL,
    user_first_name VARCHAR(100),
    user_last_name VARCHAR(100),
    user_age INTEGER,
    user_input TEXT NOT NULL,
    bot_reply TEXT NOT NULL,
    "timestamp" TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

const SESSION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_chat_logs_session_id ON chat_logs (session_id)";

/// Create the `chat_logs` table and its session index if they are missing.
pub async fn ensure_schema(pool: &AnyPool, backend: Backend) -> Result<(), StoreError> {
    let table = match backend {
        Backend::Postgres => POSTGRES_TABLE,
        Backend::Sqlite => SQLITE_TABLE,
    };

    for statement in [table, SESSION_INDEX] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Schema(e.to_string()))?;
    }

    debug!(backend = ?backend, "chat_logs schema ensured");
    Ok(())
}
