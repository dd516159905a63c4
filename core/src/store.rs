//! Local copies of the remote records.
//!
//! The store only ever replaces data wholesale. It never talks to the
//! network and never merges a fetch result with what it held before.

use crate::types::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    page: Vec<Record>,
    snapshot: Vec<Record>,
    deleted: Vec<Record>,
}

impl RecordStore {
    /// Replaces the current page's records.
    pub fn apply_list_result(&mut self, records: Vec<Record>) {
        self.page = records;
    }

    /// Replaces the include-deleted snapshot and recomputes the deleted
    /// subset from it, keeping snapshot order.
    pub fn apply_full_snapshot(&mut self, records: Vec<Record>) {
        self.deleted = records.iter().filter(|r| r.is_deleted).cloned().collect();
        self.snapshot = records;
    }

    pub fn page(&self) -> &[Record] {
        &self.page
    }

    pub fn snapshot(&self) -> &[Record] {
        &self.snapshot
    }

    pub fn deleted(&self) -> &[Record] {
        &self.deleted
    }

    /// Looks a record up on the current page.
    pub fn find(&self, id: i64) -> Option<&Record> {
        self.page.iter().find(|r| r.id == id)
    }
}
