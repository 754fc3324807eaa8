//! Periodic synthetic inserts
//!
//! A fixed-period timer that adds one generated record while anyone is
//! watching and the store has room. Ticks that find nothing to do are simply
//! dropped; late ticks are skipped, not replayed in a burst.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::protocol::Outbound;
use crate::record::RecordGenerator;
use crate::store::EmployeeStore;

use super::handler::SyncHandler;

/// Timer-driven record inserter
#[derive(Debug, Clone, Copy)]
pub struct PeriodicInserter {
    period: Duration,
}

impl PeriodicInserter {
    /// Create an inserter firing every `period`
    pub fn new(period: Duration) -> Self {
        // tokio intervals panic on a zero period
        Self {
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// Timer period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Build the ticker driving this inserter
    ///
    /// The first tick fires one full period from now. Must be called from
    /// within a tokio runtime.
    pub fn ticker(&self) -> Interval {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    /// Guard for a tick: someone is watching and there is room
    pub fn should_fire(live_sessions: usize, store: &EmployeeStore) -> bool {
        live_sessions > 0 && store.len() < store.capacity()
    }

    /// Handle one tick
    ///
    /// Performs at most one insert; returns nothing when the guard is false.
    pub fn fire<G: RecordGenerator>(
        &self,
        live_sessions: usize,
        handler: &mut SyncHandler<G>,
    ) -> Vec<Outbound> {
        if !Self::should_fire(live_sessions, handler.store()) {
            return Vec::new();
        }
        handler.insert_generated()
    }
}
