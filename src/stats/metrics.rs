//! Statistics for the sync hub

use std::time::{Duration, Instant};

use serde::Serialize;

/// Point-in-time hub statistics
///
/// Reported by the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStats {
    /// Viewers connected right now
    pub live_sessions: usize,
    /// Connections accepted since startup
    pub total_connections: u64,
    /// Records in the store
    pub records: usize,
    /// Store capacity
    pub capacity: usize,
    /// Broadcast messages sent
    pub broadcasts: u64,
    /// Unicast messages queued
    pub unicasts: u64,
    /// Frames dropped because a viewer's queue was full
    pub dropped_frames: u64,
    /// Records added by the periodic inserter
    pub timer_inserts: u64,
    /// Seconds since the hub started
    pub uptime_secs: u64,
}

/// Running counters owned by the hub
#[derive(Debug, Clone)]
pub struct HubCounters {
    pub started_at: Instant,
    pub total_connections: u64,
    pub broadcasts: u64,
    pub unicasts: u64,
    pub dropped_frames: u64,
    pub timer_inserts: u64,
}

impl HubCounters {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_connections: 0,
            broadcasts: 0,
            unicasts: 0,
            dropped_frames: 0,
            timer_inserts: 0,
        }
    }

    /// Time since the hub started
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Combine counters with current gauges into a snapshot
    pub fn snapshot(&self, live_sessions: usize, records: usize, capacity: usize) -> HubStats {
        HubStats {
            live_sessions,
            total_connections: self.total_connections,
            records,
            capacity,
            broadcasts: self.broadcasts,
            unicasts: self.unicasts,
            dropped_frames: self.dropped_frames,
            timer_inserts: self.timer_inserts,
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

impl Default for HubCounters {
    fn default() -> Self {
        Self::new()
    }
}
