use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Book, Borrower};

/// Books available for lending, alphabetically, with their author's name.
pub fn list_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.book_id, b.title, a.name, b.publication_year
             FROM books b
             JOIN authors a ON a.author_id = b.author_id
             ORDER BY b.title COLLATE NOCASE, b.book_id",
        )
        .context("failed to prepare book query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book {
                book_id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                publication_year: row.get(3)?,
            })
        })
        .context("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// A single borrower by id, or `None` if no such row exists.
pub fn fetch_borrower(conn: &Connection, borrower_id: i64) -> Result<Option<Borrower>> {
    conn.query_row(
        "SELECT borrower_id, name, contact_info FROM borrowers WHERE borrower_id = ?1",
        params![borrower_id],
        |row| {
            Ok(Borrower {
                borrower_id: row.get(0)?,
                name: row.get(1)?,
                contact_info: row.get(2)?,
            })
        },
    )
    .optional()
    .context("failed to load borrower")
}

/// The borrower a record currently points to.
pub fn borrower_for_record(conn: &Connection, record_id: i64) -> Result<Option<Borrower>> {
    let borrower_id: Option<i64> = conn
        .query_row(
            "SELECT borrower_id FROM borrow_records WHERE record_id = ?1",
            params![record_id],
            |row| row.get(0),
        )
        .optional()
        .context("failed to load record borrower")?;

    match borrower_id {
        Some(id) => fetch_borrower(conn, id),
        None => Ok(None),
    }
}
