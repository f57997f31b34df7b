//! Per-session local collections, reconciled from push events.

use std::sync::RwLock;

use chrono::Utc;
use tracing::{debug, warn};

use aidhub_core::types::{NotificationId, UserId};
use aidhub_entity::aid_request::AidRequest;
use aidhub_entity::event::{EventEnvelope, ServerEvent};
use aidhub_entity::ledger::DashboardStats;
use aidhub_entity::notification::{HiddenSet, Notification};

use crate::connection::state::ChannelStatus;
use crate::projector::StatsProjector;
use crate::reconcile::{prepend_if_absent, remove_where, replace_where, upsert_front};

#[derive(Debug, Default)]
struct Inner {
    /// Every notification addressed to this user, hidden ones included.
    inbox: Vec<Notification>,
    /// Notifications this user sent.
    sent: Vec<Notification>,
    /// Aid requests visible to this user.
    requests: Vec<AidRequest>,
    /// This user's hidden overlay.
    hidden: HiddenSet,
    /// Derived counters.
    projector: StatsProjector,
    /// Push-channel status surfaced to the UI.
    channel_status: ChannelStatus,
}

/// One connected session's view of the shared collections.
///
/// The canonical data lives on the remote service; this store holds
/// read-mostly overlays kept consistent by idempotent event application
/// plus the periodic full refresh. All mutation happens in short lock
/// sections on discrete callbacks.
#[derive(Debug)]
pub struct SyncStore {
    user_id: UserId,
    inner: RwLock<Inner>,
}

impl SyncStore {
    /// Create an empty store for one session's user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// The session's user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Decode and apply one raw frame from the push channel.
    ///
    /// Malformed or unexpected frames are dropped and logged; they never
    /// propagate out of the event loop.
    pub fn apply_raw(&self, raw: &str) {
        match serde_json::from_str::<EventEnvelope>(raw) {
            Ok(envelope) => self.apply(&envelope),
            Err(err) => warn!(error = %err, "dropping malformed channel frame"),
        }
    }

    /// Apply one event to the local collections.
    pub fn apply(&self, envelope: &EventEnvelope) {
        let mut inner = self.write();
        debug!(event = envelope.event.name(), "applying event");
        match &envelope.event {
            ServerEvent::NotificationNew { notification } => {
                if notification.is_recipient(&self.user_id) {
                    let inserted = prepend_if_absent(
                        &mut inner.inbox,
                        notification.clone(),
                        |existing| existing.id == notification.id,
                    );
                    if inserted
                        && !inner.hidden.contains(&notification.id)
                        && notification.is_unread_for(&self.user_id)
                    {
                        inner.projector.note_new_unread();
                    }
                }
                if notification.sender == Some(self.user_id) {
                    prepend_if_absent(&mut inner.sent, notification.clone(), |existing| {
                        existing.id == notification.id
                    });
                }
            }
            ServerEvent::NotificationUpdate { notification } => {
                replace_where(&mut inner.inbox, notification, |existing| {
                    existing.id == notification.id
                });
                replace_where(&mut inner.sent, notification, |existing| {
                    existing.id == notification.id
                });
                // The full record may carry read-state changes; recount.
                let unread = visible_unread(&inner, &self.user_id);
                inner.projector.set_unread(unread);
            }
            ServerEvent::NotificationDelete { notification_id } => {
                remove_where(&mut inner.inbox, |existing| existing.id == *notification_id);
                remove_where(&mut inner.sent, |existing| existing.id == *notification_id);
                inner.hidden.unhide(*notification_id);
                let unread = visible_unread(&inner, &self.user_id);
                inner.projector.set_unread(unread);
            }
            ServerEvent::NotificationRead {
                notification_id,
                user_id,
                read_at,
            } => {
                // Another session of a different user is not our concern.
                if *user_id != self.user_id {
                    return;
                }
                self.mark_read_inner(&mut inner, *notification_id, *read_at);
            }
            ServerEvent::AidStatusUpdate { request } => {
                let old = inner
                    .requests
                    .iter()
                    .find(|existing| existing.id == request.id)
                    .map(|existing| existing.status);
                upsert_front(&mut inner.requests, request, |existing| {
                    existing.id == request.id
                });
                inner.projector.note_status_change(old, request.status);
            }
            ServerEvent::StatsUpdate { stats } => {
                inner.projector.set_aggregates(*stats);
            }
        }
    }

    /// Optimistically apply a local read before the server confirms it.
    pub fn mark_read_local(&self, id: NotificationId) {
        let mut inner = self.write();
        self.mark_read_inner(&mut inner, id, Utc::now());
    }

    /// Optimistically hide a notification from this session's feed.
    pub fn hide_local(&self, id: NotificationId) {
        let mut inner = self.write();
        inner.hidden.hide(id);
        let unread = visible_unread(&inner, &self.user_id);
        inner.projector.set_unread(unread);
    }

    /// Optimistically reverse a hide.
    pub fn unhide_local(&self, id: NotificationId) {
        let mut inner = self.write();
        inner.hidden.unhide(id);
        let unread = visible_unread(&inner, &self.user_id);
        inner.projector.set_unread(unread);
    }

    fn mark_read_inner(
        &self,
        inner: &mut Inner,
        id: NotificationId,
        read_at: chrono::DateTime<Utc>,
    ) {
        let mut newly_read = false;
        if let Some(entry) = inner.inbox.iter_mut().find(|n| n.id == id) {
            newly_read = entry.mark_read(self.user_id, read_at);
        }
        if let Some(entry) = inner.sent.iter_mut().find(|n| n.id == id) {
            entry.mark_read(self.user_id, read_at);
        }
        if newly_read && !inner.hidden.contains(&id) {
            inner.projector.note_read();
        }
    }

    // Full-refresh replacements. The refetched values always win over
    // whatever incremental application produced.

    /// Replace the hidden overlay from a refetch.
    pub fn replace_hidden(&self, hidden: HiddenSet) {
        let mut inner = self.write();
        inner.hidden = hidden;
        let unread = visible_unread(&inner, &self.user_id);
        inner.projector.set_unread(unread);
    }

    /// Replace the inbox from a refetch and recount unread.
    pub fn replace_inbox(&self, inbox: Vec<Notification>) {
        let mut inner = self.write();
        inner.inbox = inbox;
        let unread = visible_unread(&inner, &self.user_id);
        inner.projector.set_unread(unread);
    }

    /// Replace the sent list from a refetch.
    pub fn replace_sent(&self, sent: Vec<Notification>) {
        self.write().sent = sent;
    }

    /// Replace the aid request collection from a refetch.
    pub fn replace_requests(&self, requests: Vec<AidRequest>) {
        self.write().requests = requests;
    }

    /// Replace the aggregate counters from a refetch.
    pub fn replace_stats(&self, stats: DashboardStats) {
        self.write().projector.set_aggregates(stats);
    }

    // Derived read models.

    /// The visible feed: addressed to this user and not hidden.
    pub fn feed(&self) -> Vec<Notification> {
        let inner = self.read();
        inner
            .inbox
            .iter()
            .filter(|n| !inner.hidden.contains(&n.id))
            .cloned()
            .collect()
    }

    /// Notifications this user sent.
    pub fn sent(&self) -> Vec<Notification> {
        self.read().sent.clone()
    }

    /// The hidden notifications, in inbox order.
    pub fn hidden(&self) -> Vec<Notification> {
        let inner = self.read();
        inner
            .inbox
            .iter()
            .filter(|n| inner.hidden.contains(&n.id))
            .cloned()
            .collect()
    }

    /// Aid requests visible to this session.
    pub fn requests(&self) -> Vec<AidRequest> {
        self.read().requests.clone()
    }

    /// Current aggregate counters.
    pub fn stats(&self) -> DashboardStats {
        self.read().projector.stats()
    }

    /// Current unread count for the visible feed.
    pub fn unread_count(&self) -> u64 {
        self.read().projector.unread()
    }

    /// Push-channel status for the UI.
    pub fn channel_status(&self) -> ChannelStatus {
        self.read().channel_status
    }

    /// Record a channel status change.
    pub fn set_channel_status(&self, status: ChannelStatus) {
        self.write().channel_status = status;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn visible_unread(inner: &Inner, user_id: &UserId) -> u64 {
    inner
        .inbox
        .iter()
        .filter(|n| !inner.hidden.contains(&n.id) && n.is_unread_for(user_id))
        .count() as u64
}
