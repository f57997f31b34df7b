//! In-memory backend implementing every gateway trait.
//!
//! Backs single-process deployments and the integration tests. Atomicity
//! that a remote backend would get from transactions is provided here by
//! per-entry map locks and one mutex around the ledger.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use aidhub_core::types::{AidRequestId, NotificationId, UniversityId, UserId};
use aidhub_core::{AppError, AppResult};
use aidhub_entity::aid_request::{AidCategory, AidRequest, AidStatus};
use aidhub_entity::ledger::{EssentialsInventory, FundPool};
use aidhub_entity::notification::Notification;
use aidhub_entity::user::{User, UserRole};

use super::{AidRequestGateway, DirectoryGateway, LedgerGateway, NotificationGateway};

#[derive(Debug, Default)]
struct LedgerState {
    pool: FundPool,
    inventory: EssentialsInventory,
}

/// In-memory implementation of the backend gateways.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    requests: DashMap<AidRequestId, AidRequest>,
    notifications: DashMap<NotificationId, Notification>,
    hidden: DashMap<UserId, BTreeSet<NotificationId>>,
    users: DashMap<UserId, User>,
    ledger: Mutex<LedgerState>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user.
    pub fn add_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    fn lock_ledger(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AidRequestGateway for MemoryBackend {
    async fn insert(&self, request: &AidRequest) -> AppResult<()> {
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn fetch(&self, id: AidRequestId) -> AppResult<Option<AidRequest>> {
        Ok(self.requests.get(&id).map(|r| r.clone()))
    }

    async fn update(&self, request: &AidRequest, expected: AidStatus) -> AppResult<()> {
        let mut entry = self.requests.get_mut(&request.id).ok_or_else(|| {
            AppError::not_found(format!("Request {} not found", request.request_code))
        })?;
        if entry.status != expected {
            return Err(AppError::conflict(format!(
                "Request {} was modified concurrently (now {})",
                request.request_code, entry.status
            )));
        }
        *entry = request.clone();
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<AidRequest>> {
        Ok(self.requests.iter().map(|r| r.clone()).collect())
    }

    async fn list_by_requester(&self, user_id: UserId) -> AppResult<Vec<AidRequest>> {
        Ok(self
            .requests
            .iter()
            .filter(|r| r.requester == user_id)
            .map(|r| r.clone())
            .collect())
    }
}

#[async_trait]
impl NotificationGateway for MemoryBackend {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn fetch(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.notifications.get(&id).map(|n| n.clone()))
    }

    async fn replace(&self, notification: &Notification) -> AppResult<()> {
        let mut entry = self.notifications.get_mut(&notification.id).ok_or_else(|| {
            AppError::not_found(format!("Notification {} not found", notification.id))
        })?;
        *entry = notification.clone();
        Ok(())
    }

    async fn remove(&self, id: NotificationId) -> AppResult<bool> {
        let removed = self.notifications.remove(&id).is_some();
        if removed {
            // Dead hidden-overlay entries would otherwise accumulate forever.
            for mut hidden in self.hidden.iter_mut() {
                hidden.remove(&id);
            }
        }
        Ok(removed)
    }

    async fn append_read(
        &self,
        id: NotificationId,
        user_id: UserId,
        read_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut entry = self
            .notifications
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        Ok(entry.mark_read(user_id, read_at))
    }

    async fn list_for_recipient(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.is_recipient(&user_id))
            .map(|n| n.clone())
            .collect())
    }

    async fn list_by_sender(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.sender == Some(user_id))
            .map(|n| n.clone())
            .collect())
    }

    async fn hidden_ids(&self, user_id: UserId) -> AppResult<BTreeSet<NotificationId>> {
        Ok(self
            .hidden
            .get(&user_id)
            .map(|set| set.clone())
            .unwrap_or_default())
    }

    async fn set_hidden(
        &self,
        user_id: UserId,
        id: NotificationId,
        hidden: bool,
    ) -> AppResult<()> {
        let mut set = self.hidden.entry(user_id).or_default();
        if hidden {
            set.insert(id);
        } else {
            set.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerGateway for MemoryBackend {
    async fn fund_pool(&self) -> AppResult<FundPool> {
        Ok(self.lock_ledger().pool)
    }

    async fn inventory(&self) -> AppResult<EssentialsInventory> {
        Ok(self.lock_ledger().inventory.clone())
    }

    async fn try_disburse(&self, request: &AidRequest) -> AppResult<bool> {
        let mut ledger = self.lock_ledger();
        let covered = match request.category {
            AidCategory::Financial => {
                let amount = request.amount_or_zero();
                if ledger.pool.can_cover(amount) {
                    ledger.pool.total_disbursed += amount;
                    true
                } else {
                    false
                }
            }
            AidCategory::Essentials => ledger.inventory.distribute(&request.items),
        };
        debug!(
            request = %request.request_code,
            covered,
            "disbursement attempt settled"
        );
        Ok(covered)
    }

    async fn release(&self, request: &AidRequest) -> AppResult<()> {
        let mut ledger = self.lock_ledger();
        match request.category {
            AidCategory::Financial => {
                ledger.pool.total_disbursed -= request.amount_or_zero();
            }
            AidCategory::Essentials => ledger.inventory.release(&request.items),
        }
        Ok(())
    }

    async fn contribute(&self, amount: i64) -> AppResult<()> {
        if amount <= 0 {
            return Err(AppError::validation("Contribution must be positive"));
        }
        self.lock_ledger().pool.total_contributed += amount;
        Ok(())
    }

    async fn donate_items(&self, name: &str, units: u32) -> AppResult<()> {
        if units == 0 {
            return Err(AppError::validation("Donation must be at least one unit"));
        }
        self.lock_ledger().inventory.donate(name, units);
        Ok(())
    }
}

#[async_trait]
impl DirectoryGateway for MemoryBackend {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn students_of(&self, university: UniversityId) -> AppResult<Vec<UserId>> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.role == UserRole::Student && u.university == Some(university))
            .map(|u| u.id)
            .collect())
    }

    async fn admins(&self) -> AppResult<Vec<UserId>> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.role == UserRole::UniversityAdmin)
            .map(|u| u.id)
            .collect())
    }

    async fn superadmins(&self) -> AppResult<Vec<UserId>> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.role == UserRole::Superadmin)
            .map(|u| u.id)
            .collect())
    }

    async fn all_users(&self) -> AppResult<Vec<UserId>> {
        Ok(self.users.iter().map(|u| u.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn financial_request(amount: i64) -> AidRequest {
        AidRequest {
            id: AidRequestId::new(),
            request_code: "AR-TEST".to_string(),
            requester: UserId::new(),
            university: None,
            category: AidCategory::Financial,
            amount: Some(amount),
            items: Vec::new(),
            reason: "rent".to_string(),
            status: AidStatus::SecondApprovalPending,
            emergency_override_required: false,
            rejected_reason: None,
            clarification_note: None,
            clarification_response: None,
            clarification_response_at: None,
            created_at: Utc::now(),
            approved_at: None,
            disbursed_at: None,
        }
    }

    #[tokio::test]
    async fn test_try_disburse_insufficient_changes_nothing() {
        let backend = MemoryBackend::new();
        backend.contribute(3_000).await.unwrap();

        let request = financial_request(5_000);
        assert!(!backend.try_disburse(&request).await.unwrap());
        assert!(!backend.try_disburse(&request).await.unwrap());
        assert_eq!(backend.fund_pool().await.unwrap().available(), 3_000);
    }

    #[tokio::test]
    async fn test_update_with_stale_status_conflicts() {
        let backend = MemoryBackend::new();
        let mut request = financial_request(1_000);
        request.status = AidStatus::PendingAdmin;
        AidRequestGateway::insert(&backend, &request).await.unwrap();

        // Another admin moved the request in the meantime.
        let mut moved = request.clone();
        moved.status = AidStatus::Rejected;
        backend.update(&moved, AidStatus::PendingAdmin).await.unwrap();

        let mut ours = request.clone();
        ours.status = AidStatus::SecondApprovalPending;
        let err = backend
            .update(&ours, AidStatus::PendingAdmin)
            .await
            .unwrap_err();
        assert_eq!(err.kind, aidhub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_remove_clears_hidden_overlays() {
        use aidhub_entity::notification::RecipientType;

        let backend = MemoryBackend::new();
        let user = UserId::new();
        let notification = Notification {
            id: NotificationId::new(),
            title: "Maintenance".to_string(),
            message: "Scheduled downtime tonight".to_string(),
            sender: None,
            recipient_type: RecipientType::All,
            recipients: vec![user],
            read_by: Vec::new(),
            is_edited: false,
            created_at: Utc::now(),
        };
        NotificationGateway::insert(&backend, &notification)
            .await
            .unwrap();
        backend.set_hidden(user, notification.id, true).await.unwrap();

        assert!(backend.remove(notification.id).await.unwrap());
        assert!(backend.hidden_ids(user).await.unwrap().is_empty());
    }
}
