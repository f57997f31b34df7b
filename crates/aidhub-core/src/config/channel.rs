//! Push-channel connection configuration.

use serde::{Deserialize, Serialize};

/// Push-channel (realtime event) connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Internal buffer size for event channels.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Base delay before the first reconnect attempt, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub reconnect_base_delay_ms: u64,
    /// Upper bound on any single reconnect delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
    /// Reconnect attempts before the channel is reported permanently down.
    #[serde(default = "default_max_attempts")]
    pub max_reconnect_attempts: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            reconnect_base_delay_ms: default_base_delay(),
            reconnect_max_delay_ms: default_max_delay(),
            max_reconnect_attempts: default_max_attempts(),
        }
    }
}

fn default_buffer_size() -> usize {
    256
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    10
}
