//! # aidhub-service
//!
//! Business logic services for AidHub: the aid request lifecycle with its
//! disbursement guard, the notification/read-state operations, recipient
//! resolution, the gateway traits that model the remote backend, an
//! in-memory backend, and the event publisher.

pub mod aid;
pub mod context;
pub mod dto;
pub mod gateway;
pub mod notification;
pub mod publisher;

pub use aid::guard::DisbursementGuard;
pub use aid::service::AidRequestService;
pub use context::RequestContext;
pub use gateway::memory::MemoryBackend;
pub use notification::service::NotificationService;
pub use publisher::{BroadcastPublisher, EventPublisher};
