//! # aidhub-entity
//!
//! Domain entities for AidHub: aid requests and their status state machine,
//! notifications with per-recipient read state, the per-user hidden overlay,
//! fund pool and essentials inventory snapshots, users, and the server event
//! envelope shared by producers and consumers.

pub mod aid_request;
pub mod event;
pub mod ledger;
pub mod notification;
pub mod user;

pub use aid_request::{AidCategory, AidRequest, AidStatus, RequestedItem};
pub use event::{EventEnvelope, ServerEvent};
pub use ledger::{DashboardStats, EssentialsInventory, FundPool};
pub use notification::{HiddenSet, Notification, ReadReceipt, RecipientType};
pub use user::{User, UserRole};
