//! Server events pushed to connected sessions.
//!
//! Every successful mutation broadcasts one of these; the synchronizer in
//! `aidhub-sync` reconciles them into each session's local collections.
//! Update events always carry the full record so receivers replace rather
//! than patch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aidhub_core::types::{NotificationId, UserId};

use crate::aid_request::AidRequest;
use crate::ledger::DashboardStats;
use crate::notification::Notification;

/// Wrapper for all pushed events with delivery metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    #[serde(flatten)]
    pub event: ServerEvent,
}

impl EventEnvelope {
    /// Create a new envelope around an event.
    pub fn new(event: ServerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Union of all pushed event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A notification was created.
    #[serde(rename = "notification:new")]
    NotificationNew {
        /// The full new notification.
        notification: Notification,
    },
    /// A notification was edited; the full record replaces local copies.
    #[serde(rename = "notification:update")]
    NotificationUpdate {
        /// The full updated notification.
        notification: Notification,
    },
    /// A notification was hard-deleted everywhere.
    #[serde(rename = "notification:delete")]
    NotificationDelete {
        /// The deleted notification's id.
        notification_id: NotificationId,
    },
    /// A user read a notification (fanned out to that user's sessions).
    #[serde(rename = "notification:read")]
    NotificationRead {
        /// The notification that was read.
        notification_id: NotificationId,
        /// Who read it.
        user_id: UserId,
        /// When they read it.
        read_at: DateTime<Utc>,
    },
    /// An aid request changed status; the full record replaces local copies.
    #[serde(rename = "aid:status:update")]
    AidStatusUpdate {
        /// The full updated request.
        request: AidRequest,
    },
    /// Aggregate counters were recomputed server-side.
    #[serde(rename = "stats:update")]
    StatsUpdate {
        /// The new aggregate block.
        stats: DashboardStats,
    },
}

impl ServerEvent {
    /// The wire name of this event type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotificationNew { .. } => "notification:new",
            Self::NotificationUpdate { .. } => "notification:update",
            Self::NotificationDelete { .. } => "notification:delete",
            Self::NotificationRead { .. } => "notification:read",
            Self::AidStatusUpdate { .. } => "aid:status:update",
            Self::StatsUpdate { .. } => "stats:update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = EventEnvelope::new(ServerEvent::NotificationDelete {
            notification_id: NotificationId::new(),
        });
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["type"], "notification:delete");
        assert!(value["notification_id"].is_string());
        assert!(value["id"].is_string());

        let parsed: EventEnvelope = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.event.name(), "notification:delete");
    }
}
