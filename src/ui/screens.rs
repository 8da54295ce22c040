use std::fmt::Display;

use crate::models::RecordRow;

/// Rows currently shown in the main table, plus the highlighted row.
#[derive(Default)]
pub(crate) struct RecordTable {
    pub(crate) rows: Vec<RecordRow>,
    pub(crate) selected: usize,
}

impl RecordTable {
    /// Replace every row, keeping the highlight on `focus_id` when it is still
    /// present.
    pub(crate) fn set_rows(&mut self, rows: Vec<RecordRow>, focus_id: Option<i64>) {
        self.rows = rows;
        if let Some(id) = focus_id {
            if let Some(idx) = self.rows.iter().position(|row| row.record_id == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    /// Drop a single row without re-querying the store.
    pub(crate) fn remove(&mut self, record_id: i64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.record_id != record_id);
        self.ensure_in_bounds();
        self.rows.len() != before
    }

    pub(crate) fn current(&self) -> Option<&RecordRow> {
        self.rows.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

/// Modal single-choice list. Used for picking the book of a new record and
/// the record to edit.
pub(crate) struct Picker<T> {
    pub(crate) title: &'static str,
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

impl<T: Display> Picker<T> {
    pub(crate) fn new(title: &'static str, items: Vec<T>) -> Self {
        Self {
            title,
            items,
            selected: 0,
        }
    }

    /// Start on the first item matching `predicate`, if any.
    pub(crate) fn preselect(mut self, predicate: impl Fn(&T) -> bool) -> Self {
        if let Some(idx) = self.items.iter().position(predicate) {
            self.selected = idx;
        }
        self
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Consume the picker and hand back the chosen item.
    pub(crate) fn into_selected(mut self) -> Option<T> {
        if self.selected < self.items.len() {
            Some(self.items.swap_remove(self.selected))
        } else {
            None
        }
    }
}
