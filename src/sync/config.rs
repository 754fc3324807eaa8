//! Sync configuration

use std::time::Duration;

use crate::store::employees::DEFAULT_CAPACITY;

/// Store and protocol settings
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum number of records in the store
    pub max_records: usize,

    /// Records per page
    pub page_size: usize,

    /// Records generated at startup
    pub initial_records: usize,

    /// Period of the synthetic insert timer
    pub insert_interval: Duration,

    /// Capacity of the hub's command queue
    pub command_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_CAPACITY,
            page_size: 10,
            initial_records: 10,
            insert_interval: Duration::from_secs(5),
            command_capacity: 256,
        }
    }
}

impl SyncConfig {
    /// Set the store capacity (at least 1)
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max.max(1);
        self
    }

    /// Set the page size (at least 1)
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Set how many records are generated at startup
    pub fn initial_records(mut self, count: usize) -> Self {
        self.initial_records = count;
        self
    }

    /// Set the insert timer period (at least 1 ms)
    pub fn insert_interval(mut self, interval: Duration) -> Self {
        self.insert_interval = interval.max(Duration::from_millis(1));
        self
    }
}
