//! Core library surface for the library loans tracker.
//!
//! The binary wires these pieces together; the integration tests drive the
//! record operations directly against an in-memory store.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use db::{
    create_record, delete_record, initialize_schema, list_books, list_records, open_memory,
    open_store, update_record,
};

pub use error::{LedgerError, ValidationError};

/// The domain types that other layers manipulate.
pub use models::{Book, Borrower, RecordDraft, RecordEdit, RecordRow};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
