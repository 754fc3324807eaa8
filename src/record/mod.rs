//! Employee records and the synthetic record generator
//!
//! Records are immutable once generated: the store only ever inserts or
//! removes them wholesale. The generator is a trait so the sync handler can
//! be driven by a deterministic source in tests.

pub mod employee;
pub mod generator;

pub use employee::{Employee, EmploymentStatus, Position};
pub use generator::{FakeGenerator, RecordGenerator};
