/// Database schema initialization.
/// Sets up SQLite WAL mode and creates tables on startup.
use rusqlite::{Connection, Result as SqliteResult};

/// Initialize database connection with WAL mode and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // WAL is only available for file-backed databases; in-memory ones keep "memory"
    let _: SqliteResult<String> = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0));
    conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")?;

    create_schema(conn)?;

    Ok(())
}

fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS statistics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            good_answers INTEGER NOT NULL,
            wrong_answers INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            FOREIGN KEY(username) REFERENCES users(username)
        );

        CREATE INDEX IF NOT EXISTS idx_statistics_username ON statistics(username);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        conn.prepare(&format!("PRAGMA table_info({})", table))
            .expect("Query failed")
            .query_map([], |row| row.get::<_, String>(1))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed")
    }

    #[test]
    fn test_initialize_in_memory_database() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let tables: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            )
            .expect("Query failed")
            .query_map([], |row| row.get(0))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed");

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"statistics".to_string()));
    }

    #[test]
    fn test_schema_columns() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let users = column_names(&conn, "users");
        assert_eq!(users, vec!["username", "password_hash", "created_at"]);

        let statistics = column_names(&conn, "statistics");
        assert!(statistics.contains(&"good_answers".to_string()));
        assert!(statistics.contains(&"wrong_answers".to_string()));
        assert!(statistics.contains(&"timestamp".to_string()));
    }

    #[test]
    fn test_initialization_is_idempotent() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("First initialization failed");
        initialize_database(&conn).expect("Second initialization failed");
    }

    #[test]
    fn test_wal_mode_on_file_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let conn = Connection::open(dir.path().join("stats.db")).expect("Failed to open DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .expect("Query failed");
        assert_eq!(journal_mode.to_lowercase(), "wal");
    }
}
