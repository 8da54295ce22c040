//! Persistence module split across logical submodules.

mod catalog;
mod connection;
mod records;

pub use catalog::{borrower_for_record, fetch_borrower, list_books};
pub use connection::{
    ensure_schema, initialize_schema, open_memory, open_store, resync_record_sequence,
};
pub use records::{create_record, delete_record, fetch_record, list_records, update_record};
