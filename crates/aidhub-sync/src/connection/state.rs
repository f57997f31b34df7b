//! Push-channel status surfaced to the UI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the push channel currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// First connection attempt in progress.
    #[default]
    Connecting,
    /// Connected and receiving events.
    Connected,
    /// Connection lost; bounded reconnect attempts are running.
    Reconnecting,
    /// Reconnect attempts exhausted; the session stays on pull-only data
    /// until a new session starts.
    Offline,
}

impl ChannelStatus {
    /// Whether events are currently flowing.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether the UI should surface a disconnected indicator.
    pub fn is_down(&self) -> bool {
        matches!(self, Self::Reconnecting | Self::Offline)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
