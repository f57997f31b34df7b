//! Notification operations and recipient resolution.

pub mod recipients;
pub mod service;

pub use recipients::RecipientResolver;
pub use service::NotificationService;
