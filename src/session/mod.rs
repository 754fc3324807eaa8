//! Connected viewer sessions
//!
//! A session exists from WebSocket open to close. It owns no store data; the
//! registry only keeps what is needed to address frames to it.

pub mod context;
pub mod registry;

pub use context::{SessionContext, SessionId};
pub use registry::{BroadcastReport, Delivery, SessionRegistry};
