//! SQLite schema for the link store
//!
//! There is no migration path: when the recorded schema version is older
//! than the one the store is opened with, the `links` table is dropped and
//! recreated empty.

use rusqlite::{Connection, Result, TransactionBehavior};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 3;

const CREATE_LINKS: &str = r#"
    DROP TABLE IF EXISTS links;

    CREATE TABLE links (
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL,
        title TEXT NOT NULL,
        category TEXT NOT NULL,
        is_pinned INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    );

    -- Category listing
    CREATE INDEX idx_links_category ON links(category);

    -- Newest-first ordering
    CREATE INDEX idx_links_created_at ON links(created_at);

    CREATE INDEX idx_links_is_pinned ON links(is_pinned);
"#;

/// What happened when the schema was checked on open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Already at the requested version, nothing touched
    Current,
    /// Fresh database, table created
    Created,
    /// Older version found, table destroyed and recreated
    Recreated { from: i32 },
    /// Database was written by a newer version; left untouched
    TooNew { found: i32 },
}

/// Bring the database to `version`, recreating the links table if needed
///
/// The check and the rebuild run in one immediate transaction, so two
/// processes opening an outdated database rebuild it once, and a reader of an
/// up-to-date database never observes a half-created table.
pub fn ensure_schema(conn: &mut Connection, version: i32) -> Result<SchemaState> {
    if !needs_init(conn, version) {
        return Ok(SchemaState::Current);
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    // Re-check under the write lock; another opener may have finished first
    let state = match get_schema_version(&tx)? {
        Some(found) if found == version => SchemaState::Current,
        Some(found) if found > version => SchemaState::TooNew { found },
        Some(found) => SchemaState::Recreated { from: found },
        None => SchemaState::Created,
    };

    if matches!(state, SchemaState::Created | SchemaState::Recreated { .. }) {
        tx.execute_batch(CREATE_LINKS)?;
        tx.execute(
            "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
            [version.to_string()],
        )?;
    }

    tx.commit()?;
    Ok(state)
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if the schema is missing or recorded under a different version
pub fn needs_init(conn: &Connection, version: i32) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v != version,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_ensure_schema_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(needs_init(&conn, SCHEMA_VERSION));

        let state = ensure_schema(&mut conn, SCHEMA_VERSION).unwrap();
        assert_eq!(state, SchemaState::Created);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"links".to_string()));
        assert!(tables.contains(&"schema_info".to_string()));
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn, SCHEMA_VERSION));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn, SCHEMA_VERSION).unwrap();
        conn.execute(
            "INSERT INTO links (id, url, title, category, is_pinned, created_at)
             VALUES ('a', 'https://a.com', 'A', 'inbox', 0, 1)",
            [],
        )
        .unwrap();

        let state = ensure_schema(&mut conn, SCHEMA_VERSION).unwrap();
        assert_eq!(state, SchemaState::Current);
        assert_eq!(link_count(&conn), 1);
    }

    #[test]
    fn test_version_bump_recreates_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn, 2).unwrap();
        conn.execute(
            "INSERT INTO links (id, url, title, category, is_pinned, created_at)
             VALUES ('a', 'https://a.com', 'A', 'inbox', 0, 1)",
            [],
        )
        .unwrap();

        let state = ensure_schema(&mut conn, 3).unwrap();
        assert_eq!(state, SchemaState::Recreated { from: 2 });
        assert_eq!(link_count(&conn), 0);
        assert_eq!(get_schema_version(&conn).unwrap(), Some(3));

        // Second open under the same version leaves it alone
        assert_eq!(ensure_schema(&mut conn, 3).unwrap(), SchemaState::Current);
    }

    #[test]
    fn test_newer_version_is_left_untouched() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn, 5).unwrap();

        let state = ensure_schema(&mut conn, 3).unwrap();
        assert_eq!(state, SchemaState::TooNew { found: 5 });
        assert_eq!(get_schema_version(&conn).unwrap(), Some(5));
    }

    #[test]
    fn test_indexes_exist() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn, SCHEMA_VERSION).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_links_category".to_string()));
        assert!(indexes.contains(&"idx_links_created_at".to_string()));
        assert!(indexes.contains(&"idx_links_is_pinned".to_string()));
    }
}
