/// Credential store: persistent storage for user records and their statistics.
///
/// Handlers only see the [`CredentialStore`] trait. Two backends implement it:
/// - [`JsonFileStore`]: whole-file JSON, rewritten on every mutation
/// - [`SqliteStore`]: SQLite tables keyed by username
///
/// Both hash passwords with bcrypt and guarantee at most one record per
/// username and no lost statistics appends under concurrent callers.

pub mod error;
pub mod init;
pub mod json_store;
pub mod models;
pub mod password;
pub mod sqlite_store;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use json_store::JsonFileStore;
pub use models::{StatEntry, UserRecord};
pub use password::PasswordHasher;
pub use sqlite_store::SqliteStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Short backend identifier for logs ("json", "sqlite")
    fn backend_name(&self) -> &'static str;

    fn hasher(&self) -> &PasswordHasher;

    /// Register a new user with an empty statistics list
    async fn create(&self, username: &str, password: &str) -> StoreResult<()>;

    async fn find(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    /// Append one entry to the user's statistics, keeping insertion order
    async fn append_statistic(&self, username: &str, entry: StatEntry) -> StoreResult<()>;

    async fn get_statistics(&self, username: &str) -> StoreResult<Vec<StatEntry>>;

    async fn list_usernames(&self) -> StoreResult<Vec<String>>;

    /// Cheap connectivity check for the health endpoint
    async fn ping(&self) -> StoreResult<()>;

    /// Check a password against the stored hash.
    ///
    /// An unknown username is always `NotFound`, never `WrongPassword`.
    async fn verify(&self, username: &str, password: &str) -> StoreResult<()> {
        let record = self.find(username).await?.ok_or(StoreError::NotFound)?;

        if self.hasher().verify(password, &record.password_hash).await? {
            Ok(())
        } else {
            Err(StoreError::WrongPassword)
        }
    }
}

/// Reject empty usernames/passwords and passwords bcrypt would truncate
pub fn validate_credentials(username: &str, password: &str) -> StoreResult<()> {
    if username.trim().is_empty() {
        return Err(StoreError::Invalid("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(StoreError::Invalid("password must not be empty".to_string()));
    }
    if password.len() > password::MAX_PASSWORD_BYTES {
        return Err(StoreError::Invalid(format!(
            "password must be at most {} bytes",
            password::MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

/// Which persistence backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreBackend {
    Json,
    Sqlite,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Json => "json",
            StoreBackend::Sqlite => "sqlite",
        }
    }
}

/// Everything needed to open a store
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub bcrypt_cost: u32,
}

/// Open the configured store.
///
/// Fails with `Unavailable` when no connection string is configured or the
/// backing storage cannot be opened; the caller decides whether to run degraded.
pub async fn connect(settings: &StoreSettings) -> StoreResult<Arc<dyn CredentialStore>> {
    let url = settings
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| StoreError::Unavailable("no store connection configured".to_string()))?;

    let hasher = PasswordHasher::new(settings.bcrypt_cost)?;

    let store: Arc<dyn CredentialStore> = match settings.backend {
        StoreBackend::Json => {
            let path = url.strip_prefix("file://").unwrap_or(url);
            Arc::new(JsonFileStore::open(PathBuf::from(path), hasher).await?)
        }
        StoreBackend::Sqlite => {
            let path = url.strip_prefix("sqlite://").unwrap_or(url);
            Arc::new(SqliteStore::open(path, hasher)?)
        }
    };

    log::info!("Connected to {} store at {}", store.backend_name(), url);
    Ok(store)
}
