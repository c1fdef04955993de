use thiserror::Error;

/// Misuse of the store's lifecycle: an operation before `initialize` or after `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("chat log store not initialized; call initialize() first")]
    NotInitialized,

    #[error("chat log store already closed")]
    Closed,
}

/// Errors from chat log store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required entry fields were empty; listed by column name.
    #[error("invalid chat log entry: missing {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("database connection error: {0}")]
    Connection(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("timed out waiting for a pooled connection")]
    PoolTimeout,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl StoreError {
    /// Whether the caller may reasonably retry the same operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Connection(_) | StoreError::Storage(_) | StoreError::PoolTimeout
        )
    }
}
