use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{info, warn};

/// Open (or create) the database file, enabling foreign keys so the
/// references between records, books and borrowers are enforced.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;
    info!(path = %path.display(), "opened library store");
    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the four tables if they are missing. Safe to call on every start;
/// stops at the first statement that fails.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS authors (
            author_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create authors table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            book_id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            publication_year INTEGER,
            FOREIGN KEY(author_id) REFERENCES authors(author_id)
        )",
        [],
    )
    .context("failed to create books table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS borrowers (
            borrower_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            contact_info TEXT
        )",
        [],
    )
    .context("failed to create borrowers table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS borrow_records (
            record_id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL,
            borrower_id INTEGER NOT NULL,
            borrow_date DATE,
            return_date DATE,
            FOREIGN KEY(book_id) REFERENCES books(book_id),
            FOREIGN KEY(borrower_id) REFERENCES borrowers(borrower_id)
        )",
        [],
    )
    .context("failed to create borrow_records table")?;

    Ok(())
}

/// Point the `borrow_records` generator at the current maximum so the next
/// generated `record_id` is `max + 1`. Returns the maximum that was applied,
/// or `None` when the table is empty and the generator was left alone.
pub fn resync_record_sequence(conn: &Connection) -> Result<Option<i64>> {
    let max: Option<i64> = conn
        .query_row("SELECT MAX(record_id) FROM borrow_records", [], |row| {
            row.get(0)
        })
        .context("failed to read the highest record id")?;

    let Some(max) = max else {
        return Ok(None);
    };

    let updated = conn
        .execute(
            "UPDATE sqlite_sequence SET seq = ?1 WHERE name = 'borrow_records'",
            params![max],
        )
        .context("failed to update record id sequence")?;
    if updated == 0 {
        conn.execute(
            "INSERT INTO sqlite_sequence (name, seq) VALUES ('borrow_records', ?1)",
            params![max],
        )
        .context("failed to seed record id sequence")?;
    }

    Ok(Some(max))
}

/// Startup routine: create the schema, then resync the record sequence. Both
/// steps always run; every failure is logged and handed back so the UI can
/// show it, and the application carries on with whatever succeeded.
pub fn initialize_schema(conn: &Connection) -> Vec<anyhow::Error> {
    let mut issues = Vec::new();

    if let Err(err) = ensure_schema(conn) {
        warn!(error = %format!("{err:#}"), "schema creation failed");
        issues.push(err);
    }

    match resync_record_sequence(conn) {
        Ok(Some(max)) => info!(next_record_id = max + 1, "record sequence resynchronized"),
        Ok(None) => {}
        Err(err) => {
            warn!(error = %format!("{err:#}"), "record sequence resync failed");
            issues.push(err);
        }
    }

    issues
}
