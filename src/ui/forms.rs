use ratatui::text::Line;

use crate::models::{format_date, Book, RecordDraft, RecordEdit, RecordRow};

use super::helpers::field_line;

/// Only digits and dashes make it into a date field.
fn accepts_date_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '-'
}

/// Fields of the "new record" form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum CreateField {
    #[default]
    BorrowerName,
    Contact,
    BorrowDate,
    ReturnDate,
}

impl CreateField {
    pub(crate) const ALL: [CreateField; 4] = [
        CreateField::BorrowerName,
        CreateField::Contact,
        CreateField::BorrowDate,
        CreateField::ReturnDate,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            CreateField::BorrowerName => "Borrower",
            CreateField::Contact => "Contact",
            CreateField::BorrowDate => "Borrowed",
            CreateField::ReturnDate => "Returned",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            CreateField::BorrowerName | CreateField::Contact => "<required>",
            CreateField::BorrowDate | CreateField::ReturnDate => "<YYYY-MM-DD>",
        }
    }
}

/// Form state for a new borrow record. The book has already been picked.
#[derive(Clone, Debug)]
pub(crate) struct CreateRecordForm {
    pub(crate) book: Book,
    pub(crate) borrower_name: String,
    pub(crate) contact_info: String,
    pub(crate) borrow_date: String,
    pub(crate) return_date: String,
    pub(crate) active: CreateField,
    pub(crate) error: Option<String>,
}

impl CreateRecordForm {
    pub(crate) fn new(book: Book) -> Self {
        Self {
            book,
            borrower_name: String::new(),
            contact_info: String::new(),
            borrow_date: String::new(),
            return_date: String::new(),
            active: CreateField::default(),
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            CreateField::BorrowerName => CreateField::Contact,
            CreateField::Contact => CreateField::BorrowDate,
            CreateField::BorrowDate => CreateField::ReturnDate,
            CreateField::ReturnDate => CreateField::BorrowerName,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            CreateField::BorrowerName => CreateField::ReturnDate,
            CreateField::Contact => CreateField::BorrowerName,
            CreateField::BorrowDate => CreateField::Contact,
            CreateField::ReturnDate => CreateField::BorrowDate,
        };
    }

    fn value_mut(&mut self, field: CreateField) -> &mut String {
        match field {
            CreateField::BorrowerName => &mut self.borrower_name,
            CreateField::Contact => &mut self.contact_info,
            CreateField::BorrowDate => &mut self.borrow_date,
            CreateField::ReturnDate => &mut self.return_date,
        }
    }

    pub(crate) fn value(&self, field: CreateField) -> &str {
        match field {
            CreateField::BorrowerName => &self.borrower_name,
            CreateField::Contact => &self.contact_info,
            CreateField::BorrowDate => &self.borrow_date,
            CreateField::ReturnDate => &self.return_date,
        }
    }

    /// Append a character to the active field, rejecting anything a date
    /// field cannot contain.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        if matches!(field, CreateField::BorrowDate | CreateField::ReturnDate)
            && !accepts_date_char(ch)
        {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    pub(crate) fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            book_id: self.book.book_id,
            borrower_name: self.borrower_name.clone(),
            contact_info: self.contact_info.clone(),
            borrow_date: self.borrow_date.clone(),
            return_date: self.return_date.clone(),
        }
    }

    pub(crate) fn build_line(&self, field: CreateField) -> Line<'static> {
        field_line(
            field.label(),
            self.value(field),
            field.placeholder(),
            self.active == field,
        )
    }

    pub(crate) fn value_len(&self, field: CreateField) -> usize {
        self.value(field).chars().count()
    }
}

/// Fields of the edit form, in tab order. Dates come first because they are
/// always required; the borrower fields are optional.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum EditField {
    #[default]
    BorrowDate,
    ReturnDate,
    BorrowerName,
    Contact,
}

impl EditField {
    pub(crate) const ALL: [EditField; 4] = [
        EditField::BorrowDate,
        EditField::ReturnDate,
        EditField::BorrowerName,
        EditField::Contact,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            EditField::BorrowDate => "Borrowed",
            EditField::ReturnDate => "Returned",
            EditField::BorrowerName => "New borrower",
            EditField::Contact => "New contact",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            EditField::BorrowDate | EditField::ReturnDate => "<YYYY-MM-DD>",
            EditField::BorrowerName => "<blank keeps current borrower>",
            EditField::Contact => "<required with a new borrower>",
        }
    }
}

/// Form state for editing an existing record. Dates start from the record's
/// current values.
#[derive(Clone, Debug)]
pub(crate) struct EditRecordForm {
    pub(crate) record: RecordRow,
    pub(crate) borrow_date: String,
    pub(crate) return_date: String,
    pub(crate) borrower_name: String,
    pub(crate) contact_info: String,
    pub(crate) active: EditField,
    pub(crate) error: Option<String>,
}

impl EditRecordForm {
    pub(crate) fn from_record(record: RecordRow) -> Self {
        Self {
            borrow_date: format_date(record.borrow_date),
            return_date: format_date(record.return_date),
            borrower_name: String::new(),
            contact_info: String::new(),
            active: EditField::default(),
            error: None,
            record,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            EditField::BorrowDate => EditField::ReturnDate,
            EditField::ReturnDate => EditField::BorrowerName,
            EditField::BorrowerName => EditField::Contact,
            EditField::Contact => EditField::BorrowDate,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            EditField::BorrowDate => EditField::Contact,
            EditField::ReturnDate => EditField::BorrowDate,
            EditField::BorrowerName => EditField::ReturnDate,
            EditField::Contact => EditField::BorrowerName,
        };
    }

    fn value_mut(&mut self, field: EditField) -> &mut String {
        match field {
            EditField::BorrowDate => &mut self.borrow_date,
            EditField::ReturnDate => &mut self.return_date,
            EditField::BorrowerName => &mut self.borrower_name,
            EditField::Contact => &mut self.contact_info,
        }
    }

    pub(crate) fn value(&self, field: EditField) -> &str {
        match field {
            EditField::BorrowDate => &self.borrow_date,
            EditField::ReturnDate => &self.return_date,
            EditField::BorrowerName => &self.borrower_name,
            EditField::Contact => &self.contact_info,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        if matches!(field, EditField::BorrowDate | EditField::ReturnDate)
            && !accepts_date_char(ch)
        {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    pub(crate) fn to_edit(&self) -> RecordEdit {
        RecordEdit {
            record_id: self.record.record_id,
            borrow_date: self.borrow_date.clone(),
            return_date: self.return_date.clone(),
            borrower_name: self.borrower_name.clone(),
            contact_info: self.contact_info.clone(),
        }
    }

    pub(crate) fn build_line(&self, field: EditField) -> Line<'static> {
        field_line(
            field.label(),
            self.value(field),
            field.placeholder(),
            self.active == field,
        )
    }

    pub(crate) fn value_len(&self, field: EditField) -> usize {
        self.value(field).chars().count()
    }
}

/// State for confirming the removal of the selected table row.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmRecordDelete {
    pub(crate) record: RecordRow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn book() -> Book {
        Book {
            book_id: 2,
            title: "Poirot".into(),
            author: "A. Christie".into(),
            publication_year: None,
        }
    }

    #[test]
    fn date_fields_reject_letters() {
        let mut form = CreateRecordForm::new(book());
        form.active = CreateField::BorrowDate;
        assert!(!form.push_char('x'));
        assert!(form.push_char('2'));
        assert!(form.push_char('-'));
        assert_eq!(form.borrow_date, "2-");
    }

    #[test]
    fn tab_order_wraps_around() {
        let mut form = CreateRecordForm::new(book());
        for _ in 0..CreateField::ALL.len() {
            form.next_field();
        }
        assert_eq!(form.active, CreateField::BorrowerName);
        form.previous_field();
        assert_eq!(form.active, CreateField::ReturnDate);
    }

    #[test]
    fn create_form_builds_draft_for_picked_book() {
        let mut form = CreateRecordForm::new(book());
        for ch in "Ann".chars() {
            form.push_char(ch);
        }
        form.backspace();
        let draft = form.to_draft();
        assert_eq!(draft.book_id, 2);
        assert_eq!(draft.borrower_name, "An");
    }

    #[test]
    fn edit_form_starts_from_current_dates() {
        let record = RecordRow {
            record_id: 5,
            book_title: "Poirot".into(),
            borrower_name: "J. Doe".into(),
            contact_info: None,
            borrow_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            return_date: None,
        };
        let form = EditRecordForm::from_record(record);
        assert_eq!(form.borrow_date, "2024-01-01");
        assert_eq!(form.return_date, "");
        assert_eq!(form.to_edit().record_id, 5);
        assert!(form.to_edit().borrower_name.is_empty());
    }
}
