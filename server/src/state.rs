/// Shared application state handed to every HTTP worker.
///
/// The store is opened once at startup. If that fails the server still runs:
/// the state remembers why, store-backed endpoints answer 503, and the health
/// check reports the database as disconnected.
use crate::db::{CredentialStore, PasswordHasher, SqliteStore, StoreError, StoreResult};
use std::sync::Arc;

#[derive(Clone)]
pub enum AppState {
    Connected(Arc<dyn CredentialStore>),
    Degraded(String),
}

/// Result of probing the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreHealth {
    Connected,
    Disconnected,
}

impl AppState {
    pub fn connected(store: Arc<dyn CredentialStore>) -> Self {
        AppState::Connected(store)
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        AppState::Degraded(reason.into())
    }

    /// A throwaway SQLite store in memory, used by tests and local experiments
    pub fn in_memory(bcrypt_cost: u32) -> StoreResult<Self> {
        let store = SqliteStore::open_in_memory(PasswordHasher::new(bcrypt_cost)?)?;
        Ok(AppState::connected(Arc::new(store)))
    }

    /// Build the state from the outcome of `db::connect`
    pub fn from_connect_result(result: StoreResult<Arc<dyn CredentialStore>>) -> Self {
        match result {
            Ok(store) => AppState::connected(store),
            Err(e) => {
                log::warn!("Starting without a credential store: {}", e);
                AppState::degraded(e.to_string())
            }
        }
    }

    pub fn store(&self) -> StoreResult<&Arc<dyn CredentialStore>> {
        match self {
            AppState::Connected(store) => Ok(store),
            AppState::Degraded(reason) => Err(StoreError::Unavailable(reason.clone())),
        }
    }

    pub async fn health(&self) -> StoreHealth {
        match self {
            AppState::Connected(store) => match store.ping().await {
                Ok(()) => StoreHealth::Connected,
                Err(e) => {
                    log::warn!("{} store failed health check: {}", store.backend_name(), e);
                    StoreHealth::Disconnected
                }
            },
            AppState::Degraded(_) => StoreHealth::Disconnected,
        }
    }
}
