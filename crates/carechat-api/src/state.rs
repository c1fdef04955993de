//! Application state wiring the chat log store and service together.
//!
//! The service is generic over `ChatLogRepository`; AppState pins it to the
//! sqlx-backed `ChatLogStore`.

use std::sync::Arc;

use carechat_core::chat_log::service::ChatLogService;
use carechat_infra::store::ChatLogStore;
use carechat_types::config::StoreConfig;

pub type ConcreteChatLogService = ChatLogService<ChatLogStore>;

/// Shared application state used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_log_service: Arc<ConcreteChatLogService>,
}

impl AppState {
    /// Open the store from `config` and wire the service.
    pub async fn init(config: &StoreConfig) -> anyhow::Result<Self> {
        let store = ChatLogStore::new();
        store.initialize(config).await?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: ChatLogStore) -> Self {
        Self {
            chat_log_service: Arc::new(ChatLogService::new(store)),
        }
    }

    pub fn store(&self) -> &ChatLogStore {
        self.chat_log_service.repo()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tempfile::TempDir;

    use super::*;

    /// State over a fresh SQLite file. Keep the `TempDir` alive for the test.
    pub(crate) async fn sqlite_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
        let state = AppState::init(&StoreConfig::with_url(url)).await.unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_init_opens_store() {
        let (_dir, state) = sqlite_state().await;
        assert_eq!(
            state.store().status().await,
            carechat_infra::store::StoreStatus::Ready
        );
    }

    #[tokio::test]
    async fn test_init_with_bad_url_fails() {
        let err = AppState::init(&StoreConfig::with_url("mysql://nowhere/db"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("mysql"));
    }
}
