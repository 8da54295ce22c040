//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. Rows read back from the store are plain data holders; the `*Draft`
//! and `*Edit` types carry raw form input and turn into validated values
//! before any statement runs.

use std::fmt;

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Format used for every date the user types or sees.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalogue entry offered in the book picker. Books are seeded outside the
/// application, so this type is read-only.
pub struct Book {
    pub book_id: i64,
    pub title: String,
    /// Name of the referenced author.
    pub author: String,
    pub publication_year: Option<i32>,
}

impl fmt::Display for Book {
    /// `<id>: <title> (<author>, <year>)`, the picker label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({}", self.book_id, self.title, self.author)?;
        if let Some(year) = self.publication_year {
            write!(f, ", {year}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A stored borrower. Rows are never shared between records by name, and
/// stay behind when a record is repointed or deleted.
pub struct Borrower {
    pub borrower_id: i64,
    pub name: String,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One line of the record table: a borrow record joined with its book title
/// and borrower details. Dates are optional because the schema allows rows
/// written by other tools to leave them empty.
pub struct RecordRow {
    pub record_id: i64,
    pub book_title: String,
    pub borrower_name: String,
    pub contact_info: Option<String>,
    pub borrow_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
}

impl RecordRow {
    /// Cell values in column order, ready for a table widget or plain-text
    /// output.
    pub fn cells(&self) -> [String; 6] {
        [
            self.record_id.to_string(),
            self.book_title.clone(),
            self.borrower_name.clone(),
            self.contact_info.clone().unwrap_or_default(),
            format_date(self.borrow_date),
            format_date(self.return_date),
        ]
    }
}

impl fmt::Display for RecordRow {
    /// Single-line summary used by the record picker in the edit flow.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record {}: {} / {}",
            self.record_id, self.book_title, self.borrower_name
        )?;
        if let Some(contact) = self.contact_info.as_deref().filter(|c| !c.is_empty()) {
            write!(f, " ({contact})")?;
        }
        write!(
            f,
            ", {} to {}",
            format_date(self.borrow_date),
            format_date(self.return_date)
        )
    }
}

/// Render an optional date the way the table shows it.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Column headings of the record table, in the order of [`RecordRow::cells`].
pub const RECORD_COLUMNS: [&str; 6] = [
    "Record ID",
    "Book",
    "Borrower",
    "Contact",
    "Borrowed",
    "Returned",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A validated borrow/return pair. Construction guarantees the return date is
/// not earlier than the borrow date.
pub struct LoanPeriod {
    borrowed: NaiveDate,
    returned: NaiveDate,
}

impl LoanPeriod {
    /// Rejects a return date earlier than the borrow date.
    pub fn new(borrowed: NaiveDate, returned: NaiveDate) -> Result<Self, ValidationError> {
        if returned < borrowed {
            return Err(ValidationError::ReturnBeforeBorrow);
        }
        Ok(Self { borrowed, returned })
    }

    /// Parse two `YYYY-MM-DD` strings and check their order.
    pub fn parse(borrow_date: &str, return_date: &str) -> Result<Self, ValidationError> {
        let borrowed = parse_date("Borrow date", borrow_date)?;
        let returned = parse_date("Return date", return_date)?;
        Self::new(borrowed, returned)
    }

    pub fn borrowed(&self) -> NaiveDate {
        self.borrowed
    }

    pub fn returned(&self) -> NaiveDate {
        self.returned
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    let malformed = || ValidationError::MalformedDate {
        field,
        value: trimmed.to_string(),
    };
    if !is_iso_date_shape(trimmed) {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| malformed())
}

/// `DDDD-DD-DD` exactly. chrono alone pads short fields and accepts a sign.
fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Borrower details about to be inserted. Both fields are non-empty.
pub struct NewBorrower {
    pub name: String,
    pub contact_info: String,
}

impl NewBorrower {
    /// Trim both fields and require them to be non-empty.
    pub fn parse(name: &str, contact_info: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("Borrower name"));
        }
        let contact_info = contact_info.trim();
        if contact_info.is_empty() {
            return Err(ValidationError::Required("Contact info"));
        }
        Ok(Self {
            name: name.to_string(),
            contact_info: contact_info.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Raw input for a new borrow record, exactly as collected from the form.
pub struct RecordDraft {
    pub book_id: i64,
    pub borrower_name: String,
    pub contact_info: String,
    pub borrow_date: String,
    pub return_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A record ready to be written: existing book, new borrower, ordered dates.
pub struct NewRecord {
    pub book_id: i64,
    pub borrower: NewBorrower,
    pub period: LoanPeriod,
}

impl RecordDraft {
    /// Check the borrower fields, then the dates. The first problem found is
    /// returned.
    pub fn validate(&self) -> Result<NewRecord, ValidationError> {
        let borrower = NewBorrower::parse(&self.borrower_name, &self.contact_info)?;
        let period = LoanPeriod::parse(&self.borrow_date, &self.return_date)?;
        Ok(NewRecord {
            book_id: self.book_id,
            borrower,
            period,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Raw input for editing an existing record. A blank `borrower_name` keeps the
/// current borrower; otherwise a new borrower row replaces it.
pub struct RecordEdit {
    pub record_id: i64,
    pub borrow_date: String,
    pub return_date: String,
    pub borrower_name: String,
    pub contact_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A validated edit. `new_borrower` is `None` when the borrower is kept.
pub struct RecordChange {
    pub record_id: i64,
    pub period: LoanPeriod,
    pub new_borrower: Option<NewBorrower>,
}

impl RecordEdit {
    pub fn validate(&self) -> Result<RecordChange, ValidationError> {
        let period = LoanPeriod::parse(&self.borrow_date, &self.return_date)?;
        let new_borrower = if self.borrower_name.trim().is_empty() {
            None
        } else {
            Some(NewBorrower::parse(&self.borrower_name, &self.contact_info)?)
        };
        Ok(RecordChange {
            record_id: self.record_id,
            period,
            new_borrower,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loan_period_accepts_same_day_return() {
        let period = LoanPeriod::parse("2024-03-01", "2024-03-01").unwrap();
        assert_eq!(period.borrowed(), period.returned());
    }

    #[test]
    fn loan_period_rejects_return_before_borrow() {
        assert_eq!(
            LoanPeriod::parse("2024-01-15", "2024-01-01"),
            Err(ValidationError::ReturnBeforeBorrow)
        );
    }

    #[test]
    fn loan_period_rejects_impossible_dates() {
        let err = LoanPeriod::parse("2024-02-30", "2024-03-01").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedDate {
                field: "Borrow date",
                value: "2024-02-30".to_string(),
            }
        );
    }

    #[test]
    fn loan_period_rejects_dates_not_in_iso_shape() {
        for raw in ["2024-1-5", "24-01-01", "+2024-01-01", "0-1-1", "2024/01/01"] {
            assert_eq!(
                LoanPeriod::parse(raw, "2024-03-01"),
                Err(ValidationError::MalformedDate {
                    field: "Borrow date",
                    value: raw.to_string(),
                }),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn iso_date_shape_allows_only_padded_digits() {
        assert!(is_iso_date_shape("2024-01-05"));
        assert!(!is_iso_date_shape("2024-01-5 "));
        assert!(!is_iso_date_shape("2024-0a-05"));
        assert!(!is_iso_date_shape("2024--1-05"));
    }

    #[test]
    fn loan_period_requires_both_dates() {
        assert_eq!(
            LoanPeriod::parse("2024-01-01", "  "),
            Err(ValidationError::Required("Return date"))
        );
    }

    #[test]
    fn draft_trims_borrower_fields() {
        let draft = RecordDraft {
            book_id: 7,
            borrower_name: "  J. Doe ".into(),
            contact_info: " j@doe.com".into(),
            borrow_date: "2024-01-01".into(),
            return_date: "2024-01-15".into(),
        };
        let record = draft.validate().unwrap();
        assert_eq!(record.book_id, 7);
        assert_eq!(record.borrower.name, "J. Doe");
        assert_eq!(record.borrower.contact_info, "j@doe.com");
        assert_eq!(record.period.returned(), date(2024, 1, 15));
    }

    #[test]
    fn draft_requires_contact() {
        let draft = RecordDraft {
            book_id: 1,
            borrower_name: "J. Doe".into(),
            borrow_date: "2024-01-01".into(),
            return_date: "2024-01-15".into(),
            ..RecordDraft::default()
        };
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required("Contact info"))
        );
    }

    #[test]
    fn edit_with_blank_name_keeps_borrower() {
        let edit = RecordEdit {
            record_id: 3,
            borrow_date: "2024-05-01".into(),
            return_date: "2024-05-10".into(),
            ..RecordEdit::default()
        };
        assert_eq!(edit.validate().unwrap().new_borrower, None);
    }

    #[test]
    fn edit_with_name_requires_contact() {
        let edit = RecordEdit {
            record_id: 3,
            borrow_date: "2024-05-01".into(),
            return_date: "2024-05-10".into(),
            borrower_name: "New Reader".into(),
            contact_info: String::new(),
        };
        assert_eq!(
            edit.validate(),
            Err(ValidationError::Required("Contact info"))
        );
    }

    #[test]
    fn record_row_formats_missing_values_as_blank() {
        let row = RecordRow {
            record_id: 4,
            book_title: "Poirot".into(),
            borrower_name: "J. Doe".into(),
            contact_info: None,
            borrow_date: Some(date(2024, 1, 1)),
            return_date: None,
        };
        assert_eq!(row.cells()[3], "");
        assert_eq!(row.cells()[4], "2024-01-01");
        assert_eq!(row.to_string(), "Record 4: Poirot / J. Doe, 2024-01-01 to ");
    }

    #[test]
    fn book_label_includes_year_when_known() {
        let book = Book {
            book_id: 1,
            title: "Poirot".into(),
            author: "A. Christie".into(),
            publication_year: Some(1920),
        };
        assert_eq!(book.to_string(), "1: Poirot (A. Christie, 1920)");
    }
}
