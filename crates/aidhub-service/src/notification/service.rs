//! Notification CRUD, read-state, and hidden-overlay operations.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use aidhub_core::types::NotificationId;
use aidhub_core::{AppError, AppResult};
use aidhub_entity::event::{EventEnvelope, ServerEvent};
use aidhub_entity::notification::{HiddenSet, Notification};

use crate::context::RequestContext;
use crate::dto::{NotificationPatch, SendNotification, validate_input};
use crate::gateway::NotificationGateway;
use crate::publisher::EventPublisher;

use super::recipients::RecipientResolver;

/// Manages the shared notification documents and each user's overlays.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationGateway>,
    resolver: RecipientResolver,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        notifications: Arc<dyn NotificationGateway>,
        resolver: RecipientResolver,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            notifications,
            resolver,
            publisher,
        }
    }

    /// Sends a notification to the resolved recipients.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        input: SendNotification,
    ) -> AppResult<Notification> {
        validate_input(&input)?;
        let recipients = self
            .resolver
            .resolve(ctx, input.recipient_type, &input.recipients)
            .await?;

        let notification = Notification {
            id: NotificationId::new(),
            title: input.title,
            message: input.message,
            sender: Some(ctx.user_id),
            recipient_type: input.recipient_type,
            recipients,
            read_by: Vec::new(),
            is_edited: false,
            created_at: Utc::now(),
        };

        self.notifications.insert(&notification).await?;
        info!(
            notification = %notification.id,
            recipient_type = %notification.recipient_type,
            recipients = notification.recipients.len(),
            "notification sent"
        );
        self.publisher
            .publish(EventEnvelope::new(ServerEvent::NotificationNew {
                notification: notification.clone(),
            }));
        Ok(notification)
    }

    /// Marks one notification read for the caller.
    ///
    /// Idempotent: a second call is a no-op and broadcasts nothing.
    pub async fn mark_read(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        let read_at = Utc::now();
        let appended = self
            .notifications
            .append_read(id, ctx.user_id, read_at)
            .await?;
        if appended {
            self.publisher
                .publish(EventEnvelope::new(ServerEvent::NotificationRead {
                    notification_id: id,
                    user_id: ctx.user_id,
                    read_at,
                }));
        }
        Ok(())
    }

    /// Marks every currently visible unread notification read.
    ///
    /// Applies receipts one at a time; a failure partway leaves the
    /// already-marked subset intact. Returns how many were marked.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let feed = self.feed(ctx).await?;
        let mut marked = 0u64;
        for notification in feed {
            if notification.is_read_by(&ctx.user_id) {
                continue;
            }
            self.mark_read(ctx, notification.id).await?;
            marked += 1;
        }
        info!(user = %ctx.user_id, marked, "marked all read");
        Ok(marked)
    }

    /// Edits a notification's title and/or message.
    ///
    /// Only the original sender may edit; the edit is flagged on the
    /// document and the full record is rebroadcast.
    pub async fn edit(
        &self,
        ctx: &RequestContext,
        id: NotificationId,
        patch: NotificationPatch,
    ) -> AppResult<Notification> {
        validate_input(&patch)?;
        let mut notification = self.fetch(id).await?;
        if notification.sender != Some(ctx.user_id) {
            return Err(AppError::permission(
                "Only the original sender can edit a notification",
            ));
        }

        if let Some(title) = patch.title {
            notification.title = title;
        }
        if let Some(message) = patch.message {
            notification.message = message;
        }
        notification.is_edited = true;

        self.notifications.replace(&notification).await?;
        self.publisher
            .publish(EventEnvelope::new(ServerEvent::NotificationUpdate {
                notification: notification.clone(),
            }));
        Ok(notification)
    }

    /// Hard-deletes a notification for every recipient.
    ///
    /// Allowed for the sender and for admin-equivalent roles. Recipients
    /// drop the id from all of their collections on the broadcast.
    pub async fn delete(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        let notification = self.fetch(id).await?;
        let is_sender = notification.sender == Some(ctx.user_id);
        if !is_sender && !ctx.is_admin_equivalent() {
            return Err(AppError::permission(
                "Only the sender or an admin can delete a notification",
            ));
        }

        self.notifications.remove(id).await?;
        info!(notification = %id, actor = %ctx.user_id, "notification deleted");
        self.publisher
            .publish(EventEnvelope::new(ServerEvent::NotificationDelete {
                notification_id: id,
            }));
        Ok(())
    }

    /// Hides a notification from the caller's feed. Idempotent.
    pub async fn hide(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        // Confirm the document exists; hiding is per-user and touches
        // nothing shared.
        self.fetch(id).await?;
        self.notifications.set_hidden(ctx.user_id, id, true).await
    }

    /// Reverses a hide. A no-op for ids that were never hidden.
    pub async fn unhide(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        self.notifications.set_hidden(ctx.user_id, id, false).await
    }

    /// Everything addressed to the caller, hidden or not, newest first.
    ///
    /// Synchronizers pull this together with the hidden overlay and apply
    /// the overlay locally; views wanting the filtered feed use [`Self::feed`].
    pub async fn inbox(&self, ctx: &RequestContext) -> AppResult<Vec<Notification>> {
        let mut inbox = self.notifications.list_for_recipient(ctx.user_id).await?;
        inbox.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inbox)
    }

    /// The caller's feed: addressed to them, not hidden, newest first.
    pub async fn feed(&self, ctx: &RequestContext) -> AppResult<Vec<Notification>> {
        let hidden = self.notifications.hidden_ids(ctx.user_id).await?;
        let mut feed: Vec<Notification> = self
            .notifications
            .list_for_recipient(ctx.user_id)
            .await?
            .into_iter()
            .filter(|n| !hidden.contains(&n.id))
            .collect();
        feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feed)
    }

    /// Notifications the caller sent, newest first.
    pub async fn sent(&self, ctx: &RequestContext) -> AppResult<Vec<Notification>> {
        let mut sent = self.notifications.list_by_sender(ctx.user_id).await?;
        sent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sent)
    }

    /// The caller's hidden overlay as a set.
    pub async fn hidden_set(&self, ctx: &RequestContext) -> AppResult<HiddenSet> {
        let ids = self.notifications.hidden_ids(ctx.user_id).await?;
        Ok(ids.into_iter().collect())
    }

    /// The notifications the caller has hidden, newest first.
    pub async fn hidden(&self, ctx: &RequestContext) -> AppResult<Vec<Notification>> {
        let ids = self.notifications.hidden_ids(ctx.user_id).await?;
        let mut hidden = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(notification) = self.notifications.fetch(id).await? {
                hidden.push(notification);
            }
        }
        hidden.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hidden)
    }

    /// How many visible notifications the caller has not read.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        let feed = self.feed(ctx).await?;
        Ok(feed
            .iter()
            .filter(|n| !n.is_read_by(&ctx.user_id))
            .count() as u64)
    }

    async fn fetch(&self, id: NotificationId) -> AppResult<Notification> {
        self.notifications
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }
}
