//! Gateway traits modeling the remote backend.
//!
//! The canonical collections are owned by the remote service; these traits
//! are the request/response surface the core consumes. Every method carries
//! the caller's bearer credential implicitly (transport concern) and maps
//! failures into [`aidhub_core::AppError`].

pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use aidhub_core::AppResult;
use aidhub_core::types::{AidRequestId, NotificationId, UniversityId, UserId};
use aidhub_entity::aid_request::{AidRequest, AidStatus};
use aidhub_entity::ledger::{EssentialsInventory, FundPool};
use aidhub_entity::notification::Notification;
use aidhub_entity::user::User;

/// Storage surface for aid requests.
#[async_trait]
pub trait AidRequestGateway: Send + Sync {
    /// Persist a newly submitted request.
    async fn insert(&self, request: &AidRequest) -> AppResult<()>;

    /// Fetch a request by id.
    async fn fetch(&self, id: AidRequestId) -> AppResult<Option<AidRequest>>;

    /// Persist an updated request.
    ///
    /// The write only succeeds while the stored status still equals
    /// `expected`; a concurrent transition surfaces as a conflict error.
    async fn update(&self, request: &AidRequest, expected: AidStatus) -> AppResult<()>;

    /// List every request.
    async fn list(&self) -> AppResult<Vec<AidRequest>>;

    /// List requests submitted by one user.
    async fn list_by_requester(&self, user_id: UserId) -> AppResult<Vec<AidRequest>>;
}

/// Storage surface for notifications and the per-user hidden overlay.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Persist a new notification.
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    /// Fetch a notification by id.
    async fn fetch(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Replace a notification document.
    async fn replace(&self, notification: &Notification) -> AppResult<()>;

    /// Hard-delete a notification everywhere. Returns `false` when absent.
    async fn remove(&self, id: NotificationId) -> AppResult<bool>;

    /// Append a read receipt, collapsing duplicates for the same user.
    ///
    /// Returns `false` when the user had already read the notification.
    async fn append_read(
        &self,
        id: NotificationId,
        user_id: UserId,
        read_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// List notifications addressed to a user.
    async fn list_for_recipient(&self, user_id: UserId) -> AppResult<Vec<Notification>>;

    /// List notifications sent by a user.
    async fn list_by_sender(&self, user_id: UserId) -> AppResult<Vec<Notification>>;

    /// The user's hidden notification ids.
    async fn hidden_ids(&self, user_id: UserId) -> AppResult<BTreeSet<NotificationId>>;

    /// Set or clear one entry of the user's hidden overlay. Idempotent.
    async fn set_hidden(
        &self,
        user_id: UserId,
        id: NotificationId,
        hidden: bool,
    ) -> AppResult<()>;
}

/// The authoritative funds and inventory ledger.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Snapshot of the financial pool.
    async fn fund_pool(&self) -> AppResult<FundPool>;

    /// Snapshot of the essentials inventory.
    async fn inventory(&self) -> AppResult<EssentialsInventory>;

    /// Atomically check coverage and decrement the pool for a request.
    ///
    /// All or nothing: returns `false` and changes nothing when the pool
    /// cannot cover the request in full. Safe to call repeatedly while
    /// insufficient.
    async fn try_disburse(&self, request: &AidRequest) -> AppResult<bool>;

    /// Return a disbursement to the pool after a lost status-write race.
    async fn release(&self, request: &AidRequest) -> AppResult<()>;

    /// Record a donor contribution to the financial pool.
    async fn contribute(&self, amount: i64) -> AppResult<()>;

    /// Record a donation of essentials units.
    async fn donate_items(&self, name: &str, units: u32) -> AppResult<()>;
}

/// User lookups needed for recipient resolution and addressing.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Fetch a user by id.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Students of one university.
    async fn students_of(&self, university: UniversityId) -> AppResult<Vec<UserId>>;

    /// All university admins.
    async fn admins(&self) -> AppResult<Vec<UserId>>;

    /// The super-admin account(s).
    async fn superadmins(&self) -> AppResult<Vec<UserId>>;

    /// Every user on the platform.
    async fn all_users(&self) -> AppResult<Vec<UserId>>;
}
