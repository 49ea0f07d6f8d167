/// SQLite-backed credential store.
///
/// Users live in a table keyed by username, so the primary-key constraint is
/// what ultimately rejects a duplicate registration. Statistics are rows in a
/// separate append-only table and come back ordered by their row id.
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::init;
use super::models::{now_iso8601, StatEntry, UserRecord};
use super::password::PasswordHasher;
use super::{validate_credentials, CredentialStore};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    hasher: PasswordHasher,
}

impl SqliteStore {
    /// Open (or create) a database file and initialize the schema
    pub fn open(path: impl AsRef<Path>, hasher: PasswordHasher) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        init::initialize_database(&conn)?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
            hasher,
        })
    }

    pub fn open_in_memory(hasher: PasswordHasher) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init::initialize_database(&conn)?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
            hasher,
        })
    }
}

fn user_exists(conn: &Connection, username: &str) -> rusqlite::Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            params![username],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn load_statistics(conn: &Connection, username: &str) -> rusqlite::Result<Vec<StatEntry>> {
    let mut stmt = conn.prepare(
        "SELECT good_answers, wrong_answers, timestamp FROM statistics WHERE username = ?1 ORDER BY id",
    )?;

    let entries = stmt
        .query_map(params![username], |row| {
            Ok(StatEntry {
                good_answers: row.get(0)?,
                wrong_answers: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

#[async_trait]
impl CredentialStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    async fn create(&self, username: &str, password: &str) -> StoreResult<()> {
        validate_credentials(username, password)?;

        {
            let conn = self.conn.lock().await;
            if user_exists(&conn, username)? {
                return Err(StoreError::AlreadyExists);
            }
        }

        let password_hash = self.hasher.hash(password).await?;

        let conn = self.conn.lock().await;
        match conn.execute(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, &password_hash, now_iso8601()],
        ) {
            Ok(_) => {
                log::debug!("Inserted user {}", username);
                Ok(())
            }
            // Lost the race against a concurrent registration of the same name
            Err(e) if is_unique_violation(&e) => Err(StoreError::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let conn = self.conn.lock().await;

        let password_hash: Option<String> = conn
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;

        let Some(password_hash) = password_hash else {
            return Ok(None);
        };

        let statistics = load_statistics(&conn, username)?;
        Ok(Some(UserRecord {
            username: username.to_string(),
            password_hash,
            statistics,
        }))
    }

    async fn append_statistic(&self, username: &str, entry: StatEntry) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        if !user_exists(&tx, username)? {
            return Err(StoreError::NotFound);
        }

        tx.execute(
            "INSERT INTO statistics (username, good_answers, wrong_answers, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                username,
                entry.good_answers,
                entry.wrong_answers,
                &entry.timestamp
            ],
        )?;
        tx.commit()?;

        log::debug!("Appended statistic for {}", username);
        Ok(())
    }

    async fn get_statistics(&self, username: &str) -> StoreResult<Vec<StatEntry>> {
        let conn = self.conn.lock().await;

        if !user_exists(&conn, username)? {
            return Err(StoreError::NotFound);
        }

        Ok(load_statistics(&conn, username)?)
    }

    async fn list_usernames(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT username FROM users ORDER BY username")?;
        let usernames = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(usernames)
    }

    async fn ping(&self) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
