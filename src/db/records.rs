use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::models::{NewBorrower, RecordChange, RecordDraft, RecordEdit, RecordRow};

const RECORD_SELECT: &str = "SELECT br.record_id, b.title, bo.name, bo.contact_info,
        br.borrow_date, br.return_date
     FROM borrow_records br
     JOIN books b ON br.book_id = b.book_id
     JOIN borrowers bo ON br.borrower_id = bo.borrower_id";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        record_id: row.get(0)?,
        book_title: row.get(1)?,
        borrower_name: row.get(2)?,
        contact_info: row.get(3)?,
        borrow_date: row.get(4)?,
        return_date: row.get(5)?,
    })
}

/// Every borrow record joined with its book and borrower. There is no ORDER
/// BY; callers must not depend on the order of the rows.
pub fn list_records(conn: &Connection) -> Result<Vec<RecordRow>, LedgerError> {
    let mut stmt = conn.prepare(RECORD_SELECT)?;
    let records = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = records.len(), "listed borrow records");
    Ok(records)
}

/// Look up a single joined record.
pub fn fetch_record(conn: &Connection, record_id: i64) -> Result<Option<RecordRow>, LedgerError> {
    let sql = format!("{RECORD_SELECT} WHERE br.record_id = ?1");
    let record = conn
        .query_row(&sql, params![record_id], record_from_row)
        .optional()?;
    Ok(record)
}

/// Validate the draft, then insert a new borrower and a record pointing at it
/// inside one transaction. The record id comes from the store's generator.
pub fn create_record(conn: &Connection, draft: &RecordDraft) -> Result<RecordRow, LedgerError> {
    let record = draft.validate()?;

    let tx = conn.unchecked_transaction()?;
    let borrower_id = insert_borrower(&tx, &record.borrower)?;
    tx.execute(
        "INSERT INTO borrow_records (book_id, borrower_id, borrow_date, return_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            record.book_id,
            borrower_id,
            record.period.borrowed(),
            record.period.returned()
        ],
    )
    .map_err(|err| map_missing_book(err, record.book_id))?;
    let record_id = tx.last_insert_rowid();

    let created = fetch_record(&tx, record_id)?.ok_or(LedgerError::RecordNotFound(record_id))?;
    tx.commit()?;

    info!(record_id, book_id = record.book_id, borrower_id, "borrow record created");
    Ok(created)
}

/// Apply new dates and, when a borrower name was given, repoint the record at
/// a freshly inserted borrower. The previous borrower row is kept.
pub fn update_record(conn: &Connection, edit: &RecordEdit) -> Result<(), LedgerError> {
    let RecordChange {
        record_id,
        period,
        new_borrower,
    } = edit.validate()?;

    let tx = conn.unchecked_transaction()?;
    let updated = match &new_borrower {
        Some(borrower) => {
            let borrower_id = insert_borrower(&tx, borrower)?;
            tx.execute(
                "UPDATE borrow_records
                 SET borrow_date = ?1, return_date = ?2, borrower_id = ?3
                 WHERE record_id = ?4",
                params![period.borrowed(), period.returned(), borrower_id, record_id],
            )?
        }
        None => tx.execute(
            "UPDATE borrow_records SET borrow_date = ?1, return_date = ?2 WHERE record_id = ?3",
            params![period.borrowed(), period.returned(), record_id],
        )?,
    };

    if updated == 0 {
        // Dropping the transaction rolls back the borrower insert as well.
        return Err(LedgerError::RecordNotFound(record_id));
    }
    tx.commit()?;

    info!(
        record_id,
        borrower_changed = new_borrower.is_some(),
        "borrow record updated"
    );
    Ok(())
}

/// Remove one record by id.
pub fn delete_record(conn: &Connection, record_id: i64) -> Result<(), LedgerError> {
    let deleted = conn.execute(
        "DELETE FROM borrow_records WHERE record_id = ?1",
        params![record_id],
    )?;

    if deleted == 0 {
        Err(LedgerError::RecordNotFound(record_id))
    } else {
        info!(record_id, "borrow record deleted");
        Ok(())
    }
}

/// Always inserts; borrowers are never reused by name.
fn insert_borrower(conn: &Connection, borrower: &NewBorrower) -> Result<i64, LedgerError> {
    conn.execute(
        "INSERT INTO borrowers (name, contact_info) VALUES (?1, ?2)",
        params![borrower.name, borrower.contact_info],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The borrower was inserted a moment ago, so a constraint failure on the
/// record insert can only be the book reference.
fn map_missing_book(err: SqlError, book_id: i64) -> LedgerError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        LedgerError::UnknownBook(book_id)
    } else {
        err.into()
    }
}
