//! Wire protocol between the server and viewers
//!
//! Every WebSocket text frame carries one JSON envelope:
//!
//! ```text
//! {"event": "requestPage", "data": 2}
//! {"event": "pageData", "data": {"records": [...], "total": 12, ...}}
//! ```
//!
//! There is no request id. Each server payload that follows a mutation carries
//! `total` and `totalPages`, so any single message is enough for a viewer to
//! know the current size of the store.

pub mod message;
pub mod outbound;

pub use message::{
    ClientMessage, ProtocolError, RecordDeleted, RecordInserted, RecordsAdded, ServerMessage,
    SyncCount, DEFAULT_ADD_COUNT,
};
pub use outbound::{Outbound, Recipient};
