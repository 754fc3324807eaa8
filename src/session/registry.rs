//! Session registry
//!
//! Tracks live viewers and their outbound queues. Delivery is fire-and-forget:
//! a viewer whose queue is full simply misses the frame, the same way a
//! lagging subscriber skips frames rather than stalling the publisher.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::context::{SessionContext, SessionId};

/// Outcome of delivering one frame to one viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the viewer's outbound channel
    Queued,
    /// Viewer's queue was full; frame dropped
    Dropped,
    /// Viewer is gone (unknown id or connection task finished)
    Gone,
}

struct SessionEntry {
    context: SessionContext,
    outbound: mpsc::Sender<Bytes>,
}

/// Registry of connected viewers
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionEntry>,
    next_id: u64,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Register a newly connected viewer
    pub fn register(&mut self, peer_addr: SocketAddr, outbound: mpsc::Sender<Bytes>) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;

        self.sessions.insert(
            id,
            SessionEntry {
                context: SessionContext::new(id, peer_addr),
                outbound,
            },
        );

        tracing::debug!(
            session_id = %id,
            peer = %peer_addr,
            live = self.sessions.len(),
            "Session registered"
        );

        id
    }

    /// Remove a viewer
    ///
    /// Unknown ids are ignored, so the live count can never underflow.
    pub fn unregister(&mut self, id: SessionId) -> Option<SessionContext> {
        let entry = self.sessions.remove(&id)?;

        tracing::debug!(
            session_id = %id,
            live = self.sessions.len(),
            duration_secs = entry.context.duration().as_secs(),
            "Session unregistered"
        );

        Some(entry.context)
    }

    /// Number of live sessions
    pub fn live_count(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no viewer is connected
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Get a session's context
    pub fn get(&self, id: SessionId) -> Option<&SessionContext> {
        self.sessions.get(&id).map(|entry| &entry.context)
    }

    /// Queue a frame for one viewer
    pub fn send_to(&self, id: SessionId, frame: Bytes) -> Delivery {
        match self.sessions.get(&id) {
            Some(entry) => deliver(entry, frame),
            None => Delivery::Gone,
        }
    }

    /// Queue a frame for every viewer
    ///
    /// Returns how many viewers had the frame queued and how many dropped it.
    pub fn broadcast(&self, frame: Bytes) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for entry in self.sessions.values() {
            match deliver(entry, frame.clone()) {
                Delivery::Queued => report.queued += 1,
                Delivery::Dropped => report.dropped += 1,
                Delivery::Gone => {}
            }
        }

        report
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-broadcast delivery counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub queued: usize,
    pub dropped: usize,
}

fn deliver(entry: &SessionEntry, frame: Bytes) -> Delivery {
    match entry.outbound.try_send(frame) {
        Ok(()) => Delivery::Queued,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(
                session_id = %entry.context.id,
                peer = %entry.context.peer_addr,
                "Outbound queue full, dropping frame"
            );
            Delivery::Dropped
        }
        // Connection task already exited; its disconnect is on the way
        Err(TrySendError::Closed(_)) => Delivery::Gone,
    }
}
