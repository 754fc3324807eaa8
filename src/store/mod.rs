//! Bounded in-memory employee store
//!
//! The store is the single source of truth for every connected viewer. It is
//! owned by the hub task and only ever mutated through [`EmployeeStore::insert_front`]
//! and [`EmployeeStore::remove_by_id`].
//!
//! ```text
//!   newest                                   oldest
//!   ┌──────┬──────┬──────┬─────┬──────┬──────┐
//!   │  0   │  1   │  2   │ ... │ n-2  │ n-1  │   n <= capacity
//!   └──────┴──────┴──────┴─────┴──────┴──────┘
//!   |<---- page 1 ---->|<---- page 2 ---->|
//! ```

pub mod employees;
pub mod error;
pub mod page;

pub use employees::EmployeeStore;
pub use error::StoreError;
pub use page::{total_pages, Page};
