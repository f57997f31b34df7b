//! Derived dashboard counters.

use serde::{Deserialize, Serialize};

use crate::aid_request::{AidRequest, AidStatus};

use super::pool::FundPool;

/// Aggregate counters shown on dashboards.
///
/// Computed authoritatively from the canonical collections and adjusted
/// incrementally from individual events between refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Requests waiting for an admin.
    pub pending_admin: u64,
    /// Requests waiting on the requester's clarification.
    pub clarification_required: u64,
    /// Requests waiting for the second approval.
    pub second_approval_pending: u64,
    /// Approved requests the pool cannot currently cover.
    pub waiting_funds: u64,
    /// Fully disbursed requests.
    pub disbursed: u64,
    /// Rejected requests.
    pub rejected: u64,
    /// Funds currently available for disbursement.
    pub available_balance: i64,
    /// Total contributed by donors.
    pub total_contributed: i64,
    /// Total already disbursed.
    pub total_disbursed: i64,
}

impl DashboardStats {
    /// Recompute every counter from the canonical collections.
    pub fn from_requests(requests: &[AidRequest], pool: &FundPool) -> Self {
        let mut stats = Self {
            available_balance: pool.available(),
            total_contributed: pool.total_contributed,
            total_disbursed: pool.total_disbursed,
            ..Self::default()
        };
        for request in requests {
            *stats.count_mut(request.status) += 1;
        }
        stats
    }

    /// The counter for a status.
    pub fn count(&self, status: AidStatus) -> u64 {
        match status {
            AidStatus::PendingAdmin => self.pending_admin,
            AidStatus::ClarificationRequired => self.clarification_required,
            AidStatus::SecondApprovalPending => self.second_approval_pending,
            AidStatus::WaitingFunds => self.waiting_funds,
            AidStatus::Disbursed => self.disbursed,
            AidStatus::Rejected => self.rejected,
        }
    }

    fn count_mut(&mut self, status: AidStatus) -> &mut u64 {
        match status {
            AidStatus::PendingAdmin => &mut self.pending_admin,
            AidStatus::ClarificationRequired => &mut self.clarification_required,
            AidStatus::SecondApprovalPending => &mut self.second_approval_pending,
            AidStatus::WaitingFunds => &mut self.waiting_funds,
            AidStatus::Disbursed => &mut self.disbursed,
            AidStatus::Rejected => &mut self.rejected,
        }
    }

    /// Apply a single status change incrementally.
    ///
    /// `old` is `None` for a request this session had not seen before.
    pub fn apply_status_change(&mut self, old: Option<AidStatus>, new: AidStatus) {
        if let Some(old) = old {
            let counter = self.count_mut(old);
            *counter = counter.saturating_sub(1);
        }
        *self.count_mut(new) += 1;
    }
}
