//! Disbursement guard — the single point where funds or items leave the pool.

use std::sync::Arc;

use tracing::info;

use aidhub_core::AppResult;
use aidhub_entity::aid_request::AidRequest;
use aidhub_entity::ledger::FundPool;

use crate::gateway::LedgerGateway;

/// Outcome of consulting the guard for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundsDecision {
    /// The pool covered the request in full and was decremented.
    Disburse,
    /// The pool could not cover the request; nothing changed.
    WaitFunds,
}

/// Validates available pooled funds or inventory before final approval.
///
/// The all-or-nothing invariant lives in the ledger's atomic
/// `try_disburse`; the guard is the only caller.
#[derive(Clone)]
pub struct DisbursementGuard {
    ledger: Arc<dyn LedgerGateway>,
}

impl std::fmt::Debug for DisbursementGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisbursementGuard").finish()
    }
}

impl DisbursementGuard {
    /// Create a new guard over the ledger.
    pub fn new(ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { ledger }
    }

    /// Attempt to cover the request from the pool.
    ///
    /// Never disburses a partial amount; a shortfall on any line leaves the
    /// pool untouched and yields [`FundsDecision::WaitFunds`].
    pub async fn settle(&self, request: &AidRequest) -> AppResult<FundsDecision> {
        if self.ledger.try_disburse(request).await? {
            info!(request = %request.request_code, "pool covered request");
            Ok(FundsDecision::Disburse)
        } else {
            info!(
                request = %request.request_code,
                "pool cannot cover request, holding for funds"
            );
            Ok(FundsDecision::WaitFunds)
        }
    }

    /// Undo a settlement whose status write lost a race.
    pub async fn release(&self, request: &AidRequest) -> AppResult<()> {
        self.ledger.release(request).await
    }

    /// Snapshot of the financial pool, for aggregate reporting.
    pub async fn pool_snapshot(&self) -> AppResult<FundPool> {
        self.ledger.fund_pool().await
    }
}
