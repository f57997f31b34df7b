//! Periodic pull-based reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use aidhub_core::AppResult;
use aidhub_service::{AidRequestService, NotificationService, RequestContext};

use crate::store::SyncStore;

/// Pulls the canonical collections and overwrites the session's local
/// copies. The refetched values are the authority of record: they win over
/// anything incremental event application produced.
pub struct SyncRefresher {
    ctx: RequestContext,
    notifications: Arc<NotificationService>,
    requests: Arc<AidRequestService>,
    store: Arc<SyncStore>,
}

impl std::fmt::Debug for SyncRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRefresher").finish()
    }
}

impl SyncRefresher {
    /// Creates a refresher for one session.
    pub fn new(
        ctx: RequestContext,
        notifications: Arc<NotificationService>,
        requests: Arc<AidRequestService>,
        store: Arc<SyncStore>,
    ) -> Self {
        Self {
            ctx,
            notifications,
            requests,
            store,
        }
    }

    /// Run one full refresh of every collection and counter.
    pub async fn refresh(&self) -> AppResult<()> {
        let hidden = self.notifications.hidden_set(&self.ctx).await?;
        let inbox = self.notifications.inbox(&self.ctx).await?;
        let sent = self.notifications.sent(&self.ctx).await?;
        let requests = self.requests.list(&self.ctx).await?;
        let stats = self.requests.stats(&self.ctx).await?;

        // Overlay before inbox so the unread recount sees the new overlay.
        self.store.replace_hidden(hidden);
        self.store.replace_inbox(inbox);
        self.store.replace_sent(sent);
        self.store.replace_requests(requests);
        self.store.replace_stats(stats);

        debug!(user = %self.ctx.user_id, "full refresh applied");
        Ok(())
    }
}

/// Spawn the periodic refresh loop.
///
/// The first tick fires immediately; the loop stops as soon as the
/// shutdown signal flips, so no timer outlives its session.
pub fn spawn_refresh_loop(
    refresher: Arc<SyncRefresher>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    // Reads fail soft: keep last-known state and try again
                    // next tick.
                    if let Err(err) = refresher.refresh().await {
                        warn!(error = %err, "periodic refresh failed");
                    }
                }
            }
        }
        debug!("refresh loop stopped");
    })
}
