use library_loans::db::{ensure_schema, resync_record_sequence};
use library_loans::*;
use rusqlite::Connection;

fn table_count(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
         AND name IN ('authors', 'books', 'borrowers', 'borrow_records')",
        [],
        |row| row.get(0),
    )
    .unwrap()
}

fn seed_book(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO authors (name) VALUES ('A. Christie');
         INSERT INTO books (author_id, title) VALUES (1, 'Poirot');
         INSERT INTO borrowers (name, contact_info) VALUES ('J. Doe', 'j@doe.com');",
    )
    .unwrap();
}

#[test]
fn initialize_twice_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.sqlite");

    let conn = open_store(&path).unwrap();
    assert!(initialize_schema(&conn).is_empty());
    assert!(initialize_schema(&conn).is_empty());
    assert_eq!(table_count(&conn), 4);
}

#[test]
fn reopening_keeps_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.sqlite");

    {
        let conn = open_store(&path).unwrap();
        assert!(initialize_schema(&conn).is_empty());
        seed_book(&conn);
    }

    let conn = open_store(&path).unwrap();
    assert!(initialize_schema(&conn).is_empty());
    assert_eq!(list_books(&conn).unwrap().len(), 1);
}

#[test]
fn open_store_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("library.sqlite");
    open_store(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO borrow_records (book_id, borrower_id) VALUES (1, 1)",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn resync_on_empty_table_is_a_no_op() {
    let conn = open_memory().unwrap();
    assert_eq!(resync_record_sequence(&conn).unwrap(), None);
}

#[test]
fn generated_ids_follow_explicit_inserts_after_resync() {
    let conn = open_memory().unwrap();
    seed_book(&conn);

    // An import that writes its own ids, as the next value after the current
    // maximum.
    conn.execute(
        "INSERT INTO borrow_records (record_id, book_id, borrower_id, borrow_date, return_date)
         VALUES (10, 1, 1, '2024-01-01', '2024-01-02')",
        [],
    )
    .unwrap();
    assert_eq!(resync_record_sequence(&conn).unwrap(), Some(10));

    let created = create_record(
        &conn,
        &RecordDraft {
            book_id: 1,
            borrower_name: "R. Roe".into(),
            contact_info: "r@roe.com".into(),
            borrow_date: "2024-02-01".into(),
            return_date: "2024-02-02".into(),
        },
    )
    .unwrap();
    assert_eq!(created.record_id, 11);
}

#[test]
fn resync_pulls_sequence_back_to_current_maximum() {
    let conn = open_memory().unwrap();
    seed_book(&conn);
    conn.execute_batch(
        "INSERT INTO borrow_records (book_id, borrower_id) VALUES (1, 1);
         INSERT INTO borrow_records (book_id, borrower_id) VALUES (1, 1);
         INSERT INTO borrow_records (book_id, borrower_id) VALUES (1, 1);
         DELETE FROM borrow_records WHERE record_id = 3;",
    )
    .unwrap();

    assert_eq!(resync_record_sequence(&conn).unwrap(), Some(2));
    let seq: i64 = conn
        .query_row(
            "SELECT seq FROM sqlite_sequence WHERE name = 'borrow_records'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(seq, 2);
}

#[test]
fn schema_created_outside_the_app_is_accepted() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE authors (author_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);",
    )
    .unwrap();
    ensure_schema(&conn).unwrap();
    assert_eq!(table_count(&conn), 4);
}

#[test]
fn read_only_store_reports_both_steps() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA query_only = ON;").unwrap();

    let issues = initialize_schema(&conn);
    assert_eq!(issues.len(), 2);
    assert!(format!("{:#}", issues[0]).contains("authors"));
}

#[test]
fn resync_failure_does_not_undo_schema() {
    // Tables created by another tool without AUTOINCREMENT have no sequence
    // to resync.
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE authors (author_id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE books (book_id INTEGER PRIMARY KEY, author_id INTEGER NOT NULL,
             title TEXT NOT NULL, publication_year INTEGER);
         CREATE TABLE borrowers (borrower_id INTEGER PRIMARY KEY, name TEXT NOT NULL,
             contact_info TEXT);
         CREATE TABLE borrow_records (record_id INTEGER PRIMARY KEY, book_id INTEGER NOT NULL,
             borrower_id INTEGER NOT NULL, borrow_date DATE, return_date DATE);
         INSERT INTO borrow_records (book_id, borrower_id) VALUES (1, 1);",
    )
    .unwrap();

    let issues = initialize_schema(&conn);
    assert_eq!(issues.len(), 1);
    assert!(format!("{:#}", issues[0]).contains("sequence"));
    assert_eq!(table_count(&conn), 4);
}
