//! ChatLogRepository trait definition.
//!
//! Append and read operations over the chat log. Entries are immutable once
//! written; there is no update or delete.

use carechat_types::chat_log::{ChatLogEntry, NewChatLogEntry};
use carechat_types::error::StoreError;

/// Repository trait for chat log persistence.
///
/// Implementations live in carechat-infra (`ChatLogStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatLogRepository: Send + Sync {
    /// Persist one exchange and return it with its assigned id and timestamp.
    ///
    /// Fails with `StoreError::Validation` if a required field is blank.
    fn append(
        &self,
        entry: &NewChatLogEntry,
    ) -> impl std::future::Future<Output = Result<ChatLogEntry, StoreError>> + Send;

    /// Fetch one entry by id.
    fn get(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ChatLogEntry>, StoreError>> + Send;

    /// Entries for a session in write order, capped at `limit` when given.
    fn list_by_session(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatLogEntry>, StoreError>> + Send;

    /// Total number of entries across all sessions.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}
