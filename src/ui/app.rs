use std::fmt::Display;
use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db::{create_record, delete_record, list_books, list_records, update_record};
use crate::error::LedgerError;
use crate::models::{Book, RecordRow, RECORD_COLUMNS};

use super::forms::{
    ConfirmRecordDelete, CreateField, CreateRecordForm, EditField, EditRecordForm,
};
use super::helpers::{centered_rect, surface_error};
use super::screens::{Picker, RecordTable};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 5;

/// What the keyboard currently drives: the table itself or one of the modal
/// prompts layered over it.
enum Mode {
    Normal,
    PickingBook(Picker<Book>),
    CreatingRecord(CreateRecordForm),
    PickingRecord(Picker<RecordRow>),
    EditingRecord(EditRecordForm),
    ConfirmDelete(ConfirmRecordDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the owned store handle, the record table and
/// whichever prompt is open.
pub struct App {
    conn: Connection,
    table: RecordTable,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the state and populate the table. Problems hit while preparing
    /// the schema are shown on the status line.
    pub fn new(conn: Connection, startup_issues: Vec<anyhow::Error>) -> Self {
        let mut app = Self {
            conn,
            table: RecordTable::default(),
            mode: Mode::Normal,
            status: None,
        };
        app.reload_records(None);

        if !startup_issues.is_empty() {
            let text = startup_issues
                .iter()
                .map(surface_error)
                .collect::<Vec<_>>()
                .join("; ");
            app.set_status(text, StatusKind::Error);
        }

        app
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::PickingBook(picker) => self.handle_pick_book(code, picker),
            Mode::CreatingRecord(form) => self.handle_create_record(code, form),
            Mode::PickingRecord(picker) => self.handle_pick_record(code, picker),
            Mode::EditingRecord(form) => self.handle_edit_record(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Char('v') | KeyCode::Char('r') => {
                self.clear_status();
                let focus = self.table.current().map(|row| row.record_id);
                if self.reload_records(focus) {
                    let count = self.table.rows.len();
                    self.set_status(format!("Loaded {count} record(s)."), StatusKind::Info);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('a') => return self.start_create(),
            KeyCode::Char('e') | KeyCode::Char('E') => return self.start_edit(),
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(record) = self.table.current().cloned() {
                    self.clear_status();
                    return Mode::ConfirmDelete(ConfirmRecordDelete { record });
                }
                self.set_status("Select a record to delete.", StatusKind::Error);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn start_create(&mut self) -> Mode {
        match list_books(&self.conn) {
            Ok(books) if books.is_empty() => {
                self.set_status("There are no books in the catalog.", StatusKind::Error);
                Mode::Normal
            }
            Ok(books) => {
                self.clear_status();
                Mode::PickingBook(Picker::new("Choose a Book", books))
            }
            Err(err) => {
                self.report_failure("load books", err);
                Mode::Normal
            }
        }
    }

    /// The edit picker lists records straight from the store rather than the
    /// table, so rows added elsewhere since the last refresh are included.
    fn start_edit(&mut self) -> Mode {
        match list_records(&self.conn) {
            Ok(records) if records.is_empty() => {
                self.set_status("There are no records to edit.", StatusKind::Error);
                Mode::Normal
            }
            Ok(records) => {
                self.clear_status();
                let focus = self.table.current().map(|row| row.record_id);
                let picker = Picker::new("Choose a Record to Edit", records)
                    .preselect(|row| Some(row.record_id) == focus);
                Mode::PickingRecord(picker)
            }
            Err(err) => {
                self.report_failure("list records", err);
                Mode::Normal
            }
        }
    }

    fn handle_pick_book(&mut self, code: KeyCode, mut picker: Picker<Book>) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => match picker.into_selected() {
                Some(book) => Mode::CreatingRecord(CreateRecordForm::new(book)),
                None => Mode::Normal,
            },
            _ => {
                navigate_picker(&mut picker, code);
                Mode::PickingBook(picker)
            }
        }
    }

    fn handle_pick_record(&mut self, code: KeyCode, mut picker: Picker<RecordRow>) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => match picker.into_selected() {
                Some(record) => Mode::EditingRecord(EditRecordForm::from_record(record)),
                None => Mode::Normal,
            },
            _ => {
                navigate_picker(&mut picker, code);
                Mode::PickingRecord(picker)
            }
        }
    }

    fn handle_create_record(&mut self, code: KeyCode, mut form: CreateRecordForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match create_record(&self.conn, &form.to_draft()) {
                Ok(record) => {
                    if self.reload_records(Some(record.record_id)) {
                        self.set_status(
                            format!("Record {} added.", record.record_id),
                            StatusKind::Info,
                        );
                    }
                    return Mode::Normal;
                }
                Err(err) => form.error = Some(self.report_failure("create record", err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::CreatingRecord(form)
    }

    fn handle_edit_record(&mut self, code: KeyCode, mut form: EditRecordForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match update_record(&self.conn, &form.to_edit()) {
                Ok(()) => {
                    let record_id = form.record.record_id;
                    if self.reload_records(Some(record_id)) {
                        self.set_status(format!("Record {record_id} updated."), StatusKind::Info);
                    }
                    return Mode::Normal;
                }
                Err(err) => form.error = Some(self.report_failure("update record", err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingRecord(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmRecordDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let record_id = confirm.record.record_id;
                match delete_record(&self.conn, record_id) {
                    Ok(()) => {
                        self.table.remove(record_id);
                        self.set_status(format!("Record {record_id} deleted."), StatusKind::Info);
                    }
                    Err(err) => {
                        self.report_failure("delete record", err);
                    }
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Re-run the record listing. On failure the table keeps what it showed
    /// before and the error goes to the status line.
    fn reload_records(&mut self, focus_id: Option<i64>) -> bool {
        match list_records(&self.conn) {
            Ok(rows) => {
                self.table.set_rows(rows, focus_id);
                true
            }
            Err(err) => {
                self.report_failure("list records", err);
                false
            }
        }
    }

    /// Log a failed action and show it on the status line. Returns the text
    /// shown so forms can repeat it inline.
    fn report_failure(&mut self, action: &str, err: impl Into<anyhow::Error>) -> String {
        let err = err.into();
        let message = surface_error(&err);
        let is_validation = err
            .downcast_ref::<LedgerError>()
            .is_some_and(LedgerError::is_validation);
        if is_validation {
            debug!(action, reason = %message, "input rejected");
        } else {
            warn!(action, error = %format!("{err:#}"), "operation failed");
        }
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_table(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::PickingBook(picker) => draw_picker(frame, area, picker),
            Mode::CreatingRecord(form) => self.draw_create_form(frame, area, form),
            Mode::PickingRecord(picker) => draw_picker(frame, area, picker),
            Mode::EditingRecord(form) => self.draw_edit_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Borrow Records");

        if self.table.rows.is_empty() {
            let message = Paragraph::new("No borrow records. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(RECORD_COLUMNS).style(header_style);
        let rows = self.table.rows.iter().map(|record| Row::new(record.cells()));
        let widths = [
            Constraint::Length(9),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Length(10),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(self.table.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[v]", key_style),
                Span::raw(" Refresh   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            Mode::PickingBook(_) | Mode::PickingRecord(_) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::CreatingRecord(_) | Mode::EditingRecord(_) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmDelete(_) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[n]", key_style),
                Span::raw(" Keep"),
            ]),
        }
    }

    fn draw_create_form(&self, frame: &mut Frame, area: Rect, form: &CreateRecordForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Record").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!("Book: {}", form.book))];
        lines.extend(CreateField::ALL.iter().map(|field| form.build_line(*field)));
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = CreateField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0);
        let prefix = form.active.label().len() as u16 + 2;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + 1 + row as u16,
        ));
    }

    fn draw_edit_form(&self, frame: &mut Frame, area: Rect, form: &EditRecordForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Edit Record").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(form.record.to_string())];
        lines.extend(EditField::ALL.iter().map(|field| form.build_line(*field)));
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = EditField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0);
        let prefix = form.active.label().len() as u16 + 2;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + 1 + row as u16,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRecordDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let record = &confirm.record;
        let lines = vec![
            Line::from(format!(
                "Delete record {} ({} / {})?",
                record.record_id, record.book_title, record.borrower_name
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

/// Shared arrow / paging keys for every picker.
fn navigate_picker<T: Display>(picker: &mut Picker<T>, code: KeyCode) {
    match code {
        KeyCode::Up => picker.move_selection(-1),
        KeyCode::Down => picker.move_selection(1),
        KeyCode::PageUp => picker.move_selection(-PAGE_STEP),
        KeyCode::PageDown => picker.move_selection(PAGE_STEP),
        KeyCode::Home => picker.select_first(),
        KeyCode::End => picker.select_last(),
        _ => {}
    }
}

fn draw_picker<T: Display>(frame: &mut Frame, area: Rect, picker: &Picker<T>) {
    let popup_area = centered_rect(70, 50, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(picker.title).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let items: Vec<ListItem> = picker.labels().into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::NONE))
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}

/// Error line when the last save failed, key hints otherwise.
fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    }
}
