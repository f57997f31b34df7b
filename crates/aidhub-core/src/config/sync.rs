//! Periodic refresh configuration.

use serde::{Deserialize, Serialize};

/// Settings for the pull-based reconciliation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between full refreshes of collections and counters, in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    60
}
