//! Store error types

use thiserror::Error;

/// Error type for store mutations
///
/// These never reach a viewer as a failure: the sync handler turns them into
/// well-formed zero/empty responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store already holds `capacity` records
    #[error("store is at capacity ({capacity} records)")]
    CapacityExceeded { capacity: usize },

    /// A record with this id is already present
    #[error("duplicate record id: {0}")]
    DuplicateId(String),
}
