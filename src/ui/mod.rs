//! Ratatui front-end: the record table, the modal prompts layered over it, and
//! the terminal loop that drives them.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use helpers::plain_table;
pub use terminal::run_app;
