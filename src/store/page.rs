//! Paged views of the store

use serde::{Deserialize, Serialize};

use crate::record::Employee;

/// One page of records plus pagination metadata
///
/// This is the payload of both the connect snapshot and page replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Records on this page, newest first
    pub records: Vec<Employee>,
    /// Total records in the store
    pub total: usize,
    /// Requested page number, echoed back as-is
    pub page: i64,
    /// `ceil(total / page_size)`
    pub total_pages: usize,
    /// Whether records exist past the end of this page
    pub has_more: bool,
}

/// Number of pages needed for `total` records
///
/// A zero page size is treated as one.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}
