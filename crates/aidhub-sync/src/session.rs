//! Session-scoped ownership of the sync machinery.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use aidhub_core::config::AppConfig;

use crate::connection::backoff::ReconnectPolicy;
use crate::connection::state::ChannelStatus;
use crate::connection::supervisor::ChannelSupervisor;
use crate::connection::ChannelTransport;
use crate::refresh::{spawn_refresh_loop, SyncRefresher};
use crate::store::SyncStore;

/// One authenticated session's synchronization resource.
///
/// Starting a session spawns the channel supervisor and the periodic
/// refresh loop; shutting it down (or dropping it) stops both. Nothing
/// here is global: logout tears the whole thing down and a new login
/// builds a fresh one.
pub struct SyncSession {
    store: Arc<SyncStore>,
    shutdown: watch::Sender<bool>,
    supervisor: Option<JoinHandle<()>>,
    refresh_loop: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("user_id", &self.store.user_id())
            .finish()
    }
}

impl SyncSession {
    /// Start synchronizing: connect the push channel and begin the
    /// periodic refresh loop.
    pub fn start(
        config: &AppConfig,
        credential: impl Into<String>,
        transport: Arc<dyn ChannelTransport>,
        refresher: Arc<SyncRefresher>,
        store: Arc<SyncStore>,
    ) -> Self {
        let (shutdown, signal) = watch::channel(false);

        let supervisor = ChannelSupervisor::new(
            transport,
            store.clone(),
            refresher.clone(),
            ReconnectPolicy::from_config(&config.channel),
            credential,
        );
        let supervisor = tokio::spawn(supervisor.run(signal.clone()));

        let refresh_loop = spawn_refresh_loop(
            refresher,
            Duration::from_secs(config.sync.refresh_interval_seconds),
            signal,
        );

        info!(user = %store.user_id(), "sync session started");
        Self {
            store,
            shutdown,
            supervisor: Some(supervisor),
            refresh_loop: Some(refresh_loop),
        }
    }

    /// The session's store of local collections.
    pub fn store(&self) -> Arc<SyncStore> {
        self.store.clone()
    }

    /// Current push-channel status.
    pub fn channel_status(&self) -> ChannelStatus {
        self.store.channel_status()
    }

    /// Stop both loops and wait for them to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.supervisor.take() {
            let _ = handle.await;
        }
        if let Some(handle) = self.refresh_loop.take() {
            let _ = handle.await;
        }
        self.store.set_channel_status(ChannelStatus::Offline);
        info!(user = %self.store.user_id(), "sync session closed");
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        // A dropped session must not leak its timers or its connection.
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.supervisor.take() {
            handle.abort();
        }
        if let Some(handle) = self.refresh_loop.take() {
            handle.abort();
        }
    }
}
