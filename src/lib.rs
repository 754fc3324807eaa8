//! Live employee directory over WebSocket
//!
//! A small push server: one bounded, newest-first store of synthetic
//! employee records is shared by every connected viewer. Viewers page
//! through it, add or delete records, and receive a broadcast whenever the
//! store changes. While anyone is watching, a timer inserts a fresh record
//! every few seconds until the store is full.
//!
//! # Example
//!
//! ```no_run
//! use employee_sync::{EmployeeServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> employee_sync::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     EmployeeServer::new(config).run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod record;
pub mod server;
pub mod session;
pub mod stats;
pub mod store;
pub mod sync;

pub use error::{ConfigError, Error, Result};
pub use protocol::{ClientMessage, ServerMessage};
pub use record::{Employee, FakeGenerator, RecordGenerator};
pub use server::{EmployeeServer, ServerConfig};
pub use store::{EmployeeStore, Page};
pub use sync::{SyncConfig, SyncHandler};
