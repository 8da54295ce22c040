use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::LedgerError;
use crate::models::{RecordRow, RECORD_COLUMNS};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error. Record
/// service errors already carry a user-facing message, so they are shown as-is
/// instead of descending into the driver's terse cause.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(ledger) = err.downcast_ref::<LedgerError>() {
        return ledger.to_string();
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Render one `Label: value` line of a modal form. Empty fields show their
/// placeholder greyed out; the focused field is highlighted.
pub(crate) fn field_line(
    label: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

/// Plain-text rendering of the record table for non-interactive output.
pub fn plain_table(rows: &[RecordRow]) -> String {
    let cells: Vec<[String; 6]> = rows.iter().map(RecordRow::cells).collect();

    let mut widths = RECORD_COLUMNS.map(|heading| heading.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, RECORD_COLUMNS.iter().copied(), &widths);
    for row in &cells {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize; 6]) {
    let line = cells
        .zip(widths.iter())
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use chrono::NaiveDate;

    #[test]
    fn surface_error_prefers_innermost_cause() {
        let err = Err::<(), _>(std::io::Error::other("disk full"))
            .context("failed to save")
            .unwrap_err();
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn surface_error_keeps_ledger_messages() {
        let err = Error::new(LedgerError::RecordNotFound(9));
        assert_eq!(surface_error(&err), "Record 9 not found.");
    }

    #[test]
    fn plain_table_aligns_columns() {
        let rows = vec![RecordRow {
            record_id: 1,
            book_title: "Poirot".into(),
            borrower_name: "J. Doe".into(),
            contact_info: Some("j@doe.com".into()),
            borrow_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            return_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        }];
        let table = plain_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Record ID  Book    Borrower  Contact"));
        assert!(lines[1].starts_with("1          Poirot  J. Doe    j@doe.com"));
        assert!(lines[1].ends_with("2024-01-01  2024-01-15"));
    }
}
