//! Chat log service used on the reply path.
//!
//! A chat turn has already produced a bot reply by the time it is logged.
//! `record_turn` never turns a logging failure into a turn failure: it logs a
//! warning and reports what happened so the caller can still show the reply.

use carechat_types::chat_log::{ChatLogEntry, NewChatLogEntry};
use carechat_types::error::StoreError;
use tracing::{debug, warn};

use crate::chat_log::repository::ChatLogRepository;

/// Result of best-effort logging of one chat turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The persisted entry, if the write succeeded.
    pub entry: Option<ChatLogEntry>,
    /// Why the write failed, if it did.
    pub log_error: Option<StoreError>,
}

impl TurnOutcome {
    pub fn is_logged(&self) -> bool {
        self.entry.is_some()
    }
}

/// Orchestrates chat log writes and reads over a `ChatLogRepository`.
pub struct ChatLogService<R: ChatLogRepository> {
    repo: R,
}

impl<R: ChatLogRepository> ChatLogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Strict append: any failure is returned to the caller.
    pub async fn append(&self, entry: &NewChatLogEntry) -> Result<ChatLogEntry, StoreError> {
        self.repo.append(entry).await
    }

    /// Best-effort append for the reply path.
    pub async fn record_turn(&self, entry: &NewChatLogEntry) -> TurnOutcome {
        match self.repo.append(entry).await {
            Ok(saved) => {
                debug!(session_id = %saved.session_id, entry_id = saved.id, "chat turn logged");
                TurnOutcome {
                    entry: Some(saved),
                    log_error: None,
                }
            }
            Err(e) => {
                warn!(
                    session_id = %entry.session_id,
                    retryable = e.is_retryable(),
                    "failed to log chat turn: {e}"
                );
                TurnOutcome {
                    entry: None,
                    log_error: Some(e),
                }
            }
        }
    }

    /// A session's exchanges in write order.
    pub async fn history(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ChatLogEntry>, StoreError> {
        self.repo.list_by_session(session_id, limit).await
    }
}
