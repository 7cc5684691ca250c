//! Row-level access to the `links` table
//!
//! Plain functions over a `Connection` so they run equally inside a
//! `Transaction` (which derefs to one). The store decides transaction scope.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use uuid::Uuid;

use crate::models::SavedLink;

const SELECT_COLUMNS: &str = "SELECT id, url, title, category, is_pinned, created_at FROM links";

/// Insert a new link; fails on a duplicate id
pub fn insert_link(conn: &Connection, link: &SavedLink) -> Result<()> {
    conn.execute(
        "INSERT INTO links (id, url, title, category, is_pinned, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            link.id.to_string(),
            link.url,
            link.title,
            link.category,
            link.is_pinned,
            link.created_at_millis(),
        ],
    )?;
    Ok(())
}

/// Get a link by id
pub fn get_link(conn: &Connection, id: &Uuid) -> Result<Option<SavedLink>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id.to_string()],
        row_to_link,
    )
    .optional()
}

/// All links, newest first
///
/// Links saved in the same millisecond come back latest-inserted first.
pub fn list_links(conn: &Connection) -> Result<Vec<SavedLink>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], row_to_link)?;
    rows.collect()
}

/// Links in one category: pinned first, then newest first
pub fn list_links_by_category(conn: &Connection, category: &str) -> Result<Vec<SavedLink>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE category = ?1 ORDER BY is_pinned DESC, created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![category], row_to_link)?;
    rows.collect()
}

/// Overwrite the mutable fields of an existing link
///
/// Returns the number of rows changed (0 when the id is unknown).
pub fn update_link(conn: &Connection, link: &SavedLink) -> Result<usize> {
    conn.execute(
        "UPDATE links SET title = ?2, category = ?3, is_pinned = ?4 WHERE id = ?1",
        params![
            link.id.to_string(),
            link.title,
            link.category,
            link.is_pinned
        ],
    )
}

/// Flip the pinned flag; returns rows changed
pub fn toggle_pin(conn: &Connection, id: &Uuid) -> Result<usize> {
    conn.execute(
        "UPDATE links SET is_pinned = NOT is_pinned WHERE id = ?1",
        params![id.to_string()],
    )
}

/// Delete a link; returns rows removed
pub fn delete_link(conn: &Connection, id: &Uuid) -> Result<usize> {
    conn.execute("DELETE FROM links WHERE id = ?1", params![id.to_string()])
}

/// Remove every link
pub fn clear_links(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM links", [])?;
    Ok(())
}

/// Count links
pub fn count_links(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
}

fn row_to_link(row: &Row<'_>) -> Result<SavedLink> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: i64 = row.get(5)?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_at).ok_or(
        rusqlite::Error::IntegralValueOutOfRange(5, created_at),
    )?;

    Ok(SavedLink {
        id,
        url: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        is_pinned: row.get(4)?,
        created_at,
    })
}
