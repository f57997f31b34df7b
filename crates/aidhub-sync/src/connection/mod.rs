//! Push-channel connection: transport port, status, backoff, supervisor.

pub mod backoff;
pub mod state;
pub mod supervisor;

use async_trait::async_trait;
use tokio::sync::mpsc;

use aidhub_core::AppResult;

pub use backoff::ReconnectPolicy;
pub use state::ChannelStatus;
pub use supervisor::ChannelSupervisor;

/// Transport that opens an authenticated push-channel connection.
///
/// The returned receiver yields raw JSON frames until the connection
/// drops, at which point the sender side closes and the supervisor takes
/// over reconnection.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Connect with the session's bearer credential.
    async fn connect(&self, credential: &str) -> AppResult<mpsc::Receiver<String>>;
}
