//! Aid request lifecycle operations.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use aidhub_core::types::AidRequestId;
use aidhub_core::{AppError, AppResult};
use aidhub_entity::aid_request::{AidCategory, AidRequest, AidStatus, RequestedItem};
use aidhub_entity::event::{EventEnvelope, ServerEvent};
use aidhub_entity::ledger::DashboardStats;

use crate::context::RequestContext;
use crate::dto::{SubmitAidRequest, validate_input};
use crate::gateway::AidRequestGateway;
use crate::publisher::EventPublisher;

use super::guard::{DisbursementGuard, FundsDecision};

/// Drives aid requests through the status state machine.
///
/// Every operation validates the transition against the status table,
/// persists with an expected-status check, and broadcasts the full updated
/// request on success.
#[derive(Clone)]
pub struct AidRequestService {
    requests: Arc<dyn AidRequestGateway>,
    guard: DisbursementGuard,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for AidRequestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AidRequestService").finish()
    }
}

impl AidRequestService {
    /// Creates a new aid request service.
    pub fn new(
        requests: Arc<dyn AidRequestGateway>,
        guard: DisbursementGuard,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            requests,
            guard,
            publisher,
        }
    }

    /// Submits a new aid request on behalf of the caller.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        input: SubmitAidRequest,
    ) -> AppResult<AidRequest> {
        validate_input(&input)?;
        match input.category {
            AidCategory::Financial => {
                if input.amount.unwrap_or(0) <= 0 {
                    return Err(AppError::validation(
                        "A financial request needs a positive amount",
                    ));
                }
            }
            AidCategory::Essentials => {
                if input.items.is_empty() {
                    return Err(AppError::validation(
                        "An essentials request needs at least one item",
                    ));
                }
            }
        }

        let request = AidRequest {
            id: AidRequestId::new(),
            request_code: generate_request_code(),
            requester: ctx.user_id,
            university: ctx.university,
            category: input.category,
            amount: match input.category {
                AidCategory::Financial => input.amount,
                AidCategory::Essentials => None,
            },
            items: input
                .items
                .into_iter()
                .map(|item| RequestedItem {
                    name: item.name,
                    quantity: item.quantity,
                })
                .collect(),
            reason: input.reason,
            status: AidStatus::PendingAdmin,
            emergency_override_required: input.emergency,
            rejected_reason: None,
            clarification_note: None,
            clarification_response: None,
            clarification_response_at: None,
            created_at: Utc::now(),
            approved_at: None,
            disbursed_at: None,
        };

        self.requests.insert(&request).await?;
        info!(
            request = %request.request_code,
            requester = %request.requester,
            category = %request.category,
            "aid request submitted"
        );
        self.broadcast(&request).await;
        Ok(request)
    }

    /// Verifies a request, moving it to the second-approval queue.
    ///
    /// Requests flagged for emergency handling need `override_confirmed`;
    /// without it the call fails with an override-required error so the
    /// view can prompt and retry.
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        id: AidRequestId,
        override_confirmed: bool,
    ) -> AppResult<AidRequest> {
        ensure_admin(ctx)?;
        let mut request = self.fetch(id).await?;
        ensure_transition(&request, AidStatus::SecondApprovalPending)?;
        if request.emergency_override_required && !override_confirmed {
            return Err(AppError::override_required(format!(
                "Request {} is flagged for emergency handling; confirm the override to verify",
                request.request_code
            )));
        }

        let expected = request.status;
        request.status = AidStatus::SecondApprovalPending;
        self.persist(request, expected).await
    }

    /// Rejects a request with a reason.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        id: AidRequestId,
        reason: &str,
    ) -> AppResult<AidRequest> {
        ensure_admin(ctx)?;
        if reason.trim().is_empty() {
            return Err(AppError::validation("A rejection reason is required"));
        }
        let mut request = self.fetch(id).await?;
        ensure_transition(&request, AidStatus::Rejected)?;

        let expected = request.status;
        request.status = AidStatus::Rejected;
        request.rejected_reason = Some(reason.trim().to_string());
        self.persist(request, expected).await
    }

    /// Asks the requester for clarification.
    pub async fn request_clarification(
        &self,
        ctx: &RequestContext,
        id: AidRequestId,
        note: &str,
    ) -> AppResult<AidRequest> {
        ensure_admin(ctx)?;
        if note.trim().is_empty() {
            return Err(AppError::validation("A clarification note is required"));
        }
        let mut request = self.fetch(id).await?;
        ensure_transition(&request, AidStatus::ClarificationRequired)?;

        let expected = request.status;
        request.status = AidStatus::ClarificationRequired;
        request.clarification_note = Some(note.trim().to_string());
        self.persist(request, expected).await
    }

    /// Records the requester's clarification reply and re-enters the queue.
    pub async fn respond_to_clarification(
        &self,
        ctx: &RequestContext,
        id: AidRequestId,
        response: &str,
    ) -> AppResult<AidRequest> {
        if response.trim().is_empty() {
            return Err(AppError::validation("A clarification response is required"));
        }
        let mut request = self.fetch(id).await?;
        if request.requester != ctx.user_id {
            return Err(AppError::permission(
                "Only the requester can respond to a clarification",
            ));
        }
        ensure_transition(&request, AidStatus::PendingAdmin)?;

        let expected = request.status;
        request.status = AidStatus::PendingAdmin;
        request.clarification_response = Some(response.trim().to_string());
        request.clarification_response_at = Some(Utc::now());
        self.persist(request, expected).await
    }

    /// Grants the second approval and consults the disbursement guard.
    ///
    /// The resulting status is a computed outcome, not a caller choice:
    /// `disbursed` when the pool covers the request, `waiting_funds`
    /// otherwise.
    pub async fn final_approve(
        &self,
        ctx: &RequestContext,
        id: AidRequestId,
    ) -> AppResult<AidRequest> {
        ensure_admin(ctx)?;
        let mut request = self.fetch(id).await?;
        if request.status != AidStatus::SecondApprovalPending {
            return Err(AppError::invalid_state(format!(
                "Request {} cannot be finally approved from {}",
                request.request_code, request.status
            )));
        }

        let expected = request.status;
        let decision = self.guard.settle(&request).await?;
        let now = Utc::now();
        request.approved_at = Some(now);
        match decision {
            FundsDecision::Disburse => {
                request.status = AidStatus::Disbursed;
                request.disbursed_at = Some(now);
            }
            FundsDecision::WaitFunds => {
                request.status = AidStatus::WaitingFunds;
            }
        }

        self.persist_settled(request, expected, decision).await
    }

    /// Re-checks the pool for a request held in `waiting_funds`.
    ///
    /// Safe to call repeatedly: while the pool still cannot cover the
    /// request nothing changes and no event is broadcast.
    pub async fn recheck_funds(
        &self,
        ctx: &RequestContext,
        id: AidRequestId,
    ) -> AppResult<AidRequest> {
        ensure_admin(ctx)?;
        let mut request = self.fetch(id).await?;
        if request.status != AidStatus::WaitingFunds {
            return Err(AppError::invalid_state(format!(
                "Request {} is not waiting for funds (currently {})",
                request.request_code, request.status
            )));
        }

        let expected = request.status;
        let decision = self.guard.settle(&request).await?;
        if decision == FundsDecision::WaitFunds {
            info!(request = %request.request_code, "funds still insufficient");
            return Ok(request);
        }

        let now = Utc::now();
        request.status = AidStatus::Disbursed;
        request.disbursed_at = Some(now);
        self.persist_settled(request, expected, decision).await
    }

    /// Fetches one request, scoped to the caller.
    pub async fn get(&self, ctx: &RequestContext, id: AidRequestId) -> AppResult<AidRequest> {
        let request = self.fetch(id).await?;
        if !ctx.is_admin_equivalent() && request.requester != ctx.user_id {
            return Err(AppError::permission("Not your request"));
        }
        Ok(request)
    }

    /// Lists the requests visible to the caller, newest first.
    ///
    /// The super-admin sees everything, a university admin their own
    /// university, and everyone else their own submissions.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<AidRequest>> {
        let mut requests = if ctx.role.is_superadmin() {
            self.requests.list().await?
        } else if ctx.is_admin_equivalent() {
            let all = self.requests.list().await?;
            match ctx.university {
                Some(university) => all
                    .into_iter()
                    .filter(|r| r.university == Some(university))
                    .collect(),
                None => all,
            }
        } else {
            self.requests.list_by_requester(ctx.user_id).await?
        };
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Recomputes the dashboard counters from the collection visible to
    /// the caller (per-university for university admins, global for the
    /// super-admin).
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<DashboardStats> {
        let requests = self.list(ctx).await?;
        let pool = self.guard.pool_snapshot().await?;
        Ok(DashboardStats::from_requests(&requests, &pool))
    }

    async fn fetch(&self, id: AidRequestId) -> AppResult<AidRequest> {
        self.requests
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Aid request {id} not found")))
    }

    async fn persist(&self, request: AidRequest, expected: AidStatus) -> AppResult<AidRequest> {
        self.requests.update(&request, expected).await?;
        info!(
            request = %request.request_code,
            status = %request.status,
            "aid request transitioned"
        );
        self.broadcast(&request).await;
        Ok(request)
    }

    /// Persist after the guard already moved funds; a lost status race
    /// returns the settlement to the pool before surfacing the conflict.
    async fn persist_settled(
        &self,
        request: AidRequest,
        expected: AidStatus,
        decision: FundsDecision,
    ) -> AppResult<AidRequest> {
        if let Err(err) = self.requests.update(&request, expected).await {
            if decision == FundsDecision::Disburse {
                if let Err(release_err) = self.guard.release(&request).await {
                    warn!(
                        request = %request.request_code,
                        error = %release_err,
                        "failed to return settlement to the pool"
                    );
                }
            }
            return Err(err);
        }
        info!(
            request = %request.request_code,
            status = %request.status,
            "aid request transitioned"
        );
        self.broadcast(&request).await;
        Ok(request)
    }

    /// Broadcast the updated request, then the recomputed aggregates.
    async fn broadcast(&self, request: &AidRequest) {
        self.publisher
            .publish(EventEnvelope::new(ServerEvent::AidStatusUpdate {
                request: request.clone(),
            }));

        match self.aggregate_stats().await {
            Ok(stats) => self
                .publisher
                .publish(EventEnvelope::new(ServerEvent::StatsUpdate { stats })),
            Err(err) => warn!(error = %err, "failed to recompute aggregate stats"),
        }
    }

    async fn aggregate_stats(&self) -> AppResult<DashboardStats> {
        let requests = self.requests.list().await?;
        let pool = self.guard.pool_snapshot().await?;
        Ok(DashboardStats::from_requests(&requests, &pool))
    }
}

fn ensure_admin(ctx: &RequestContext) -> AppResult<()> {
    if !ctx.is_admin_equivalent() {
        return Err(AppError::permission(
            "Only an admin can act on aid requests",
        ));
    }
    Ok(())
}

fn ensure_transition(request: &AidRequest, to: AidStatus) -> AppResult<()> {
    if !request.status.can_transition(to) {
        return Err(AppError::invalid_state(format!(
            "Request {} cannot move from {} to {}",
            request.request_code, request.status, to
        )));
    }
    Ok(())
}

fn generate_request_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("AR-{}", uuid[..8].to_uppercase())
}
