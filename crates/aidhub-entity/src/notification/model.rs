//! Notification entity model with per-recipient read state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidhub_core::types::{NotificationId, UserId, UserRef};

use super::recipient::RecipientType;

/// One recipient's read receipt.
///
/// The user side is kept in its wire representation; every comparison goes
/// through [`UserRef`] normalization so historical payload shapes stay
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadReceipt {
    /// Who read the notification.
    pub user: UserRef,
    /// When they read it.
    pub read_at: DateTime<Utc>,
}

/// A notification fanned out to one or more recipients.
///
/// The document is shared; the read-receipt set is the only per-viewer
/// mutable projection stored on it. Per-user hiding lives outside the
/// document entirely (see [`super::hidden::HiddenSet`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// The sending user, or `None` for system notifications.
    pub sender: Option<UserId>,
    /// How the recipient list was addressed.
    pub recipient_type: RecipientType,
    /// The resolved recipients.
    pub recipients: Vec<UserId>,
    /// Read receipts, one per recipient who has viewed it.
    #[serde(default)]
    pub read_by: Vec<ReadReceipt>,
    /// Whether the sender has edited the notification after sending.
    #[serde(default)]
    pub is_edited: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check whether the given user is among the recipients.
    pub fn is_recipient(&self, user_id: &UserId) -> bool {
        self.recipients.contains(user_id)
    }

    /// Check whether the given user has read this notification, under
    /// loose identifier equality.
    pub fn is_read_by(&self, user_id: &UserId) -> bool {
        self.read_by.iter().any(|r| r.user.matches(user_id))
    }

    /// Check whether this notification counts as unread for the user.
    pub fn is_unread_for(&self, user_id: &UserId) -> bool {
        self.is_recipient(user_id) && !self.is_read_by(user_id)
    }

    /// Record a read receipt for the user.
    ///
    /// Idempotent: returns `false` and appends nothing when a receipt for
    /// the same logical user already exists in any representation.
    pub fn mark_read(&mut self, user_id: UserId, read_at: DateTime<Utc>) -> bool {
        if self.is_read_by(&user_id) {
            return false;
        }
        self.read_by.push(ReadReceipt {
            user: UserRef::Id(user_id),
            read_at,
        });
        true
    }
}
