//! Push-channel connect/reconnect loop.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::refresh::SyncRefresher;
use crate::store::SyncStore;

use super::backoff::ReconnectPolicy;
use super::state::ChannelStatus;
use super::ChannelTransport;

/// Owns one session's push-channel connection.
///
/// Connects with the session credential, feeds raw frames into the store,
/// and reconnects with bounded jittered backoff. Events missed while
/// disconnected are not replayed; each successful (re)connect triggers a
/// full pull-based refresh instead.
pub struct ChannelSupervisor {
    transport: Arc<dyn ChannelTransport>,
    store: Arc<SyncStore>,
    refresher: Arc<SyncRefresher>,
    policy: ReconnectPolicy,
    credential: String,
}

impl std::fmt::Debug for ChannelSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSupervisor").finish()
    }
}

impl ChannelSupervisor {
    /// Creates a new supervisor.
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        store: Arc<SyncStore>,
        refresher: Arc<SyncRefresher>,
        policy: ReconnectPolicy,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            refresher,
            policy,
            credential: credential.into(),
        }
    }

    /// Runs the connect loop until shutdown or attempt exhaustion.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;
        loop {
            match self.transport.connect(&self.credential).await {
                Ok(mut frames) => {
                    attempt = 0;
                    self.store.set_channel_status(ChannelStatus::Connected);
                    info!(user = %self.store.user_id(), "push channel connected");

                    // Reconciliation-by-refetch: anything missed while away
                    // is picked up here, not replayed event by event.
                    if let Err(err) = self.refresher.refresh().await {
                        warn!(error = %err, "post-connect refresh failed");
                    }

                    loop {
                        tokio::select! {
                            _ = shutdown.changed() => {
                                debug!("channel supervisor stopping");
                                return;
                            }
                            frame = frames.recv() => match frame {
                                Some(raw) => self.store.apply_raw(&raw),
                                None => {
                                    warn!("push channel disconnected");
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, attempt, "push channel connect failed");
                }
            }

            self.store.set_channel_status(ChannelStatus::Reconnecting);
            match self.policy.delay_for(attempt) {
                Some(delay) => {
                    attempt += 1;
                    tokio::select! {
                        _ = shutdown.changed() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => {
                    self.store.set_channel_status(ChannelStatus::Offline);
                    warn!(
                        attempts = self.policy.max_attempts(),
                        "reconnect attempts exhausted, staying offline"
                    );
                    return;
                }
            }
        }
    }
}
