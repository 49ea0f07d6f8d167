/// Flat-file credential store.
///
/// The whole store is a single JSON object mapping username to record. It is
/// loaded into memory on open and rewritten in full after every mutation,
/// which makes writes O(n) but keeps the on-disk file always complete: new
/// contents go to a unique temp file in the same directory that is then
/// renamed over the original.
///
/// Every mutation is a commit: under one async mutex a copy of the map is
/// changed, written out, and only then swapped in. The commit runs as its own
/// task, so a caller that goes away mid-request cannot leave memory and disk
/// disagreeing.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::models::{StatEntry, UserRecord};
use super::password::PasswordHasher;
use super::{validate_credentials, CredentialStore};

/// On-disk value for one user. Early files stored only the hash string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Record {
        #[serde(rename = "passwordHash")]
        password_hash: String,
        #[serde(default)]
        statistics: Vec<StatEntry>,
    },
    LegacyHash(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredUserRef<'a> {
    password_hash: &'a str,
    statistics: &'a [StatEntry],
}

type UserMap = BTreeMap<String, UserRecord>;

pub struct JsonFileStore {
    path: PathBuf,
    users: Arc<Mutex<UserMap>>,
    hasher: PasswordHasher,
}

impl JsonFileStore {
    /// Load the store from `path`. A missing file is an empty store; the file
    /// is created by the first mutation.
    pub async fn open(path: PathBuf, hasher: PasswordHasher) -> StoreResult<Self> {
        let users = match tokio::fs::read(&path).await {
            Ok(bytes) => parse_users(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => UserMap::new(),
            Err(e) => return Err(e.into()),
        };

        log::info!("Loaded {} users from {}", users.len(), path.display());

        Ok(JsonFileStore {
            path,
            users: Arc::new(Mutex::new(users)),
            hasher,
        })
    }

    /// Apply `mutate` to a copy of the map, write the copy, then swap it in.
    ///
    /// Runs detached from the caller: once started, the commit finishes even
    /// if the awaiting future is dropped.
    async fn commit<F>(&self, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut UserMap) -> StoreResult<()> + Send + 'static,
    {
        let users = Arc::clone(&self.users);
        let path = self.path.clone();

        tokio::spawn(async move {
            let mut users = users.lock_owned().await;

            let mut candidate = users.clone();
            mutate(&mut candidate)?;
            let bytes = encode_users(&candidate)?;

            tokio::task::spawn_blocking(move || write_replacing(&path, &bytes)).await??;

            *users = candidate;
            Ok(())
        })
        .await?
    }
}

fn parse_users(bytes: &[u8]) -> StoreResult<UserMap> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(UserMap::new());
    }

    let stored: BTreeMap<String, StoredUser> = serde_json::from_slice(bytes)?;
    let users = stored
        .into_iter()
        .map(|(username, user)| {
            let (password_hash, statistics) = match user {
                StoredUser::Record {
                    password_hash,
                    statistics,
                } => (password_hash, statistics),
                StoredUser::LegacyHash(password_hash) => (password_hash, Vec::new()),
            };
            let record = UserRecord {
                username: username.clone(),
                password_hash,
                statistics,
            };
            (username, record)
        })
        .collect();

    Ok(users)
}

fn encode_users(users: &UserMap) -> StoreResult<Vec<u8>> {
    let on_disk: BTreeMap<&str, StoredUserRef<'_>> = users
        .iter()
        .map(|(name, record)| {
            (
                name.as_str(),
                StoredUserRef {
                    password_hash: &record.password_hash,
                    statistics: &record.statistics,
                },
            )
        })
        .collect();

    Ok(serde_json::to_vec_pretty(&on_disk)?)
}

/// Write `bytes` to a fresh temp file next to `path` and rename it into place
fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    async fn create(&self, username: &str, password: &str) -> StoreResult<()> {
        validate_credentials(username, password)?;

        if self.users.lock().await.contains_key(username) {
            return Err(StoreError::AlreadyExists);
        }

        let password_hash = self.hasher.hash(password).await?;

        let name = username.to_string();
        self.commit(move |users| {
            // Another registration may have won while we were hashing
            if users.contains_key(&name) {
                return Err(StoreError::AlreadyExists);
            }
            users.insert(
                name.clone(),
                UserRecord {
                    username: name,
                    password_hash,
                    statistics: Vec::new(),
                },
            );
            Ok(())
        })
        .await?;

        log::debug!("Inserted user {} into {}", username, self.path.display());
        Ok(())
    }

    async fn find(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.lock().await.get(username).cloned())
    }

    async fn append_statistic(&self, username: &str, entry: StatEntry) -> StoreResult<()> {
        let name = username.to_string();
        self.commit(move |users| {
            users
                .get_mut(&name)
                .ok_or(StoreError::NotFound)?
                .statistics
                .push(entry);
            Ok(())
        })
        .await?;

        log::debug!("Appended statistic for {}", username);
        Ok(())
    }

    async fn get_statistics(&self, username: &str) -> StoreResult<Vec<StatEntry>> {
        self.users
            .lock()
            .await
            .get(username)
            .map(|record| record.statistics.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn list_usernames(&self) -> StoreResult<Vec<String>> {
        Ok(self.users.lock().await.keys().cloned().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        tokio::fs::metadata(dir).await?;
        Ok(())
    }
}
