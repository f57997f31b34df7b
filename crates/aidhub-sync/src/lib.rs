//! # aidhub-sync
//!
//! Client-session synchronization for AidHub. Provides:
//!
//! - A per-session store of local collections (feed, sent list, aid
//!   requests, hidden overlay) reconciled from push events
//! - A stats projector that adjusts counters incrementally and yields to
//!   the periodic refetch
//! - A push-channel supervisor with bounded, jittered reconnect backoff
//! - A periodic full-refresh loop as the correctness backstop
//! - A session-scoped resource that owns both loops and tears them down
//!   on logout

pub mod connection;
pub mod projector;
pub mod reconcile;
pub mod refresh;
pub mod session;
pub mod store;

pub use connection::backoff::ReconnectPolicy;
pub use connection::state::ChannelStatus;
pub use connection::supervisor::ChannelSupervisor;
pub use connection::ChannelTransport;
pub use projector::StatsProjector;
pub use refresh::SyncRefresher;
pub use session::SyncSession;
pub use store::SyncStore;
