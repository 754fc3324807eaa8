//! Store synchronization between one store and many viewers
//!
//! The hub task owns the store, the session registry and the periodic
//! inserter. Connection tasks talk to it through a [`HubHandle`]; since a
//! single task applies every event in arrival order, no two mutations ever
//! interleave and the store needs no lock.
//!
//! ```text
//!   [Connection]──┐                      ┌──► outbound queue ──► WebSocket
//!   [Connection]──┼──► mpsc<Command> ──► Hub ──► outbound queue ──► WebSocket
//!   [Connection]──┘                      │ └──► outbound queue ──► WebSocket
//!                              ticker ───┘
//!                         (PeriodicInserter)
//! ```

pub mod config;
pub mod handler;
pub mod hub;
pub mod inserter;

pub use config::SyncConfig;
pub use handler::SyncHandler;
pub use hub::{Command, Hub, HubHandle};
pub use inserter::PeriodicInserter;
