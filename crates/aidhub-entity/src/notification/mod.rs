//! Notification entity, per-recipient read state, and the hidden overlay.

pub mod hidden;
pub mod model;
pub mod recipient;

pub use hidden::HiddenSet;
pub use model::{Notification, ReadReceipt};
pub use recipient::RecipientType;
