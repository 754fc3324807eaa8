//! Session identity and metadata

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Unique id of a connected viewer
///
/// Ids are allocated in increasing order and never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only information about a session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Unique session ID
    pub id: SessionId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// When the WebSocket was opened
    pub connected_at: Instant,
}

impl SessionContext {
    /// Create a new context
    pub fn new(id: SessionId, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            connected_at: Instant::now(),
        }
    }

    /// Get session duration
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
