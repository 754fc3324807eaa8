//! Employee store implementation

use std::collections::VecDeque;

use crate::record::Employee;

use super::error::StoreError;
use super::page::{total_pages, Page};

/// Default maximum number of records
pub const DEFAULT_CAPACITY: usize = 20;

/// Ordered, bounded, newest-first record collection
#[derive(Debug, Clone)]
pub struct EmployeeStore {
    /// Records, index 0 is the newest
    records: VecDeque<Employee>,
    /// Maximum number of records
    capacity: usize,
}

impl EmployeeStore {
    /// Create an empty store with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store holding at most `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend a record, making it the newest
    pub fn insert_front(&mut self, record: Employee) -> Result<(), StoreError> {
        if self.records.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.contains(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }

        self.records.push_front(record);
        Ok(())
    }

    /// Remove the record with the given id
    ///
    /// Returns `None` when no such record exists; removing twice is harmless.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Employee> {
        let index = self.records.iter().position(|r| r.id == id)?;
        self.records.remove(index)
    }

    /// Get a page of records
    ///
    /// Pages are 1-based. Page numbers below 1 or past the end produce an
    /// empty page rather than an error.
    pub fn page(&self, page_number: i64, page_size: usize) -> Page {
        let page_size = page_size.max(1);
        let total = self.records.len();

        let start = usize::try_from(page_number.saturating_sub(1))
            .ok()
            .filter(|_| page_number >= 1)
            .and_then(|index| index.checked_mul(page_size))
            .filter(|start| *start < total);

        let (records, has_more) = match start {
            Some(start) => {
                let end = start.saturating_add(page_size);
                let records = self
                    .records
                    .iter()
                    .skip(start)
                    .take(page_size)
                    .cloned()
                    .collect();
                (records, end < total)
            }
            None => (Vec::new(), false),
        };

        Page {
            records,
            total,
            page: page_number,
            total_pages: total_pages(total, page_size),
            has_more,
        }
    }

    /// Check whether a record with this id is present
    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots left before the store is full
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.records.len())
    }

    /// Check if the store is at capacity
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Iterate records newest first
    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.records.iter()
    }

    /// Snapshot of every record, newest first
    pub fn all(&self) -> Vec<Employee> {
        self.records.iter().cloned().collect()
    }
}

impl Default for EmployeeStore {
    fn default() -> Self {
        Self::new()
    }
}
