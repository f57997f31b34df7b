//! Integration tests for the aid request lifecycle.

use std::sync::{Arc, Mutex};

use aidhub_core::error::ErrorKind;
use aidhub_core::types::{UniversityId, UserId};
use aidhub_entity::aid_request::{AidCategory, AidStatus};
use aidhub_entity::event::EventEnvelope;
use aidhub_entity::user::{User, UserRole};
use aidhub_service::dto::{RequestedItemInput, SubmitAidRequest};
use aidhub_service::gateway::LedgerGateway;
use aidhub_service::{
    AidRequestService, DisbursementGuard, EventPublisher, MemoryBackend, RequestContext,
};

/// Publisher that records envelopes for assertions.
#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingPublisher {
    fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event.name())
            .collect()
    }

    fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, envelope: EventEnvelope) {
        self.events.lock().unwrap().push(envelope);
    }
}

struct TestApp {
    backend: Arc<MemoryBackend>,
    service: AidRequestService,
    publisher: Arc<RecordingPublisher>,
    admin: RequestContext,
    student: RequestContext,
}

fn test_app() -> TestApp {
    let backend = Arc::new(MemoryBackend::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let guard = DisbursementGuard::new(backend.clone());
    let service = AidRequestService::new(backend.clone(), guard, publisher.clone());

    let university = UniversityId::new();
    let admin_user = User {
        id: UserId::new(),
        name: "Admin".to_string(),
        role: UserRole::UniversityAdmin,
        university: Some(university),
    };
    let student_user = User {
        id: UserId::new(),
        name: "Student".to_string(),
        role: UserRole::Student,
        university: Some(university),
    };
    backend.add_user(admin_user.clone());
    backend.add_user(student_user.clone());

    TestApp {
        backend,
        service,
        publisher,
        admin: RequestContext::for_user(&admin_user),
        student: RequestContext::for_user(&student_user),
    }
}

fn financial_input(amount: i64, emergency: bool) -> SubmitAidRequest {
    SubmitAidRequest {
        category: AidCategory::Financial,
        amount: Some(amount),
        items: Vec::new(),
        reason: "semester fees".to_string(),
        emergency,
    }
}

fn essentials_input(items: &[(&str, u32)]) -> SubmitAidRequest {
    SubmitAidRequest {
        category: AidCategory::Essentials,
        amount: None,
        items: items
            .iter()
            .map(|(name, quantity)| RequestedItemInput {
                name: name.to_string(),
                quantity: *quantity,
            })
            .collect(),
        reason: "household essentials".to_string(),
        emergency: false,
    }
}

#[tokio::test]
async fn test_submit_broadcasts_and_starts_pending() {
    let app = test_app();

    let request = app
        .service
        .submit(&app.student, financial_input(2_000, false))
        .await
        .unwrap();

    assert_eq!(request.status, AidStatus::PendingAdmin);
    assert!(request.request_code.starts_with("AR-"));
    assert_eq!(
        app.publisher.event_names(),
        vec!["aid:status:update", "stats:update"]
    );
}

#[tokio::test]
async fn test_submit_validation() {
    let app = test_app();

    let err = app
        .service
        .submit(
            &app.student,
            SubmitAidRequest {
                category: AidCategory::Financial,
                amount: None,
                items: Vec::new(),
                reason: "rent".to_string(),
                emergency: false,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .service
        .submit(&app.student, essentials_input(&[]))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_verify_requires_override_confirmation() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(2_000, true))
        .await
        .unwrap();

    let err = app
        .service
        .verify(&app.admin, request.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::OverrideRequired);

    // Status is untouched by the refused attempt.
    let unchanged = app.service.get(&app.admin, request.id).await.unwrap();
    assert_eq!(unchanged.status, AidStatus::PendingAdmin);

    let verified = app
        .service
        .verify(&app.admin, request.id, true)
        .await
        .unwrap();
    assert_eq!(verified.status, AidStatus::SecondApprovalPending);
}

#[tokio::test]
async fn test_final_approve_waits_then_disburses_after_topup() {
    let app = test_app();
    app.backend.contribute(3_000).await.unwrap();

    let request = app
        .service
        .submit(&app.student, financial_input(5_000, false))
        .await
        .unwrap();
    app.service.verify(&app.admin, request.id, false).await.unwrap();

    // The pool cannot cover it: computed outcome is waiting_funds and the
    // balance is untouched.
    let held = app
        .service
        .final_approve(&app.admin, request.id)
        .await
        .unwrap();
    assert_eq!(held.status, AidStatus::WaitingFunds);
    assert!(held.approved_at.is_some());
    assert!(held.disbursed_at.is_none());
    assert_eq!(app.backend.fund_pool().await.unwrap().available(), 3_000);

    // Rechecking while still short is a reported no-op: no pool movement,
    // no broadcast.
    let before = app.publisher.count();
    let still_held = app
        .service
        .recheck_funds(&app.admin, request.id)
        .await
        .unwrap();
    assert_eq!(still_held.status, AidStatus::WaitingFunds);
    assert_eq!(app.publisher.count(), before);
    assert_eq!(app.backend.fund_pool().await.unwrap().available(), 3_000);

    // A donor tops the pool up; the recheck now disburses.
    app.backend.contribute(3_000).await.unwrap();
    let disbursed = app
        .service
        .recheck_funds(&app.admin, request.id)
        .await
        .unwrap();
    assert_eq!(disbursed.status, AidStatus::Disbursed);
    assert!(disbursed.disbursed_at.is_some());
    assert_eq!(app.backend.fund_pool().await.unwrap().available(), 1_000);
}

#[tokio::test]
async fn test_essentials_disbursement_is_all_or_nothing() {
    let app = test_app();
    app.backend.donate_items("rice", 10).await.unwrap();

    let request = app
        .service
        .submit(&app.student, essentials_input(&[("rice", 5), ("blankets", 2)]))
        .await
        .unwrap();
    app.service.verify(&app.admin, request.id, false).await.unwrap();

    // Blankets are short, so nothing moves — not even the rice.
    let held = app
        .service
        .final_approve(&app.admin, request.id)
        .await
        .unwrap();
    assert_eq!(held.status, AidStatus::WaitingFunds);
    let inventory = app.backend.inventory().await.unwrap();
    assert_eq!(inventory.available_units("rice"), 10);

    app.backend.donate_items("blankets", 2).await.unwrap();
    let disbursed = app
        .service
        .recheck_funds(&app.admin, request.id)
        .await
        .unwrap();
    assert_eq!(disbursed.status, AidStatus::Disbursed);
    let inventory = app.backend.inventory().await.unwrap();
    assert_eq!(inventory.available_units("rice"), 5);
    assert_eq!(inventory.available_units("blankets"), 0);
}

#[tokio::test]
async fn test_reject_requires_reason_and_pending_state() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(1_000, false))
        .await
        .unwrap();

    let err = app
        .service
        .reject(&app.admin, request.id, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let rejected = app
        .service
        .reject(&app.admin, request.id, "Insufficient documentation")
        .await
        .unwrap();
    assert_eq!(rejected.status, AidStatus::Rejected);
    assert_eq!(
        rejected.rejected_reason.as_deref(),
        Some("Insufficient documentation")
    );

    // Terminal: nothing moves a rejected request.
    let err = app
        .service
        .verify(&app.admin, request.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    let err = app
        .service
        .reject(&app.admin, request.id, "again")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_reject_refused_outside_pending() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(1_000, false))
        .await
        .unwrap();
    app.service.verify(&app.admin, request.id, false).await.unwrap();

    let err = app
        .service
        .reject(&app.admin, request.id, "too late")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_clarification_roundtrip() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(1_500, false))
        .await
        .unwrap();

    let err = app
        .service
        .request_clarification(&app.admin, request.id, "")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let clarifying = app
        .service
        .request_clarification(&app.admin, request.id, "Which semester is this for?")
        .await
        .unwrap();
    assert_eq!(clarifying.status, AidStatus::ClarificationRequired);

    // Only the requester may answer.
    let err = app
        .service
        .respond_to_clarification(&app.admin, request.id, "Fall")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Permission);

    let answered = app
        .service
        .respond_to_clarification(&app.student, request.id, "Fall semester")
        .await
        .unwrap();
    assert_eq!(answered.status, AidStatus::PendingAdmin);
    assert_eq!(
        answered.clarification_response.as_deref(),
        Some("Fall semester")
    );
    assert!(answered.clarification_response_at.is_some());
}

#[tokio::test]
async fn test_admin_can_verify_directly_from_clarification() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(1_500, false))
        .await
        .unwrap();
    app.service
        .request_clarification(&app.admin, request.id, "Need a receipt")
        .await
        .unwrap();

    let verified = app
        .service
        .verify(&app.admin, request.id, false)
        .await
        .unwrap();
    assert_eq!(verified.status, AidStatus::SecondApprovalPending);
}

#[tokio::test]
async fn test_students_cannot_act_on_requests() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(1_000, false))
        .await
        .unwrap();

    let err = app
        .service
        .verify(&app.student, request.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Permission);
    let err = app
        .service
        .reject(&app.student, request.id, "no")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Permission);
}

#[tokio::test]
async fn test_second_verify_is_refused() {
    let app = test_app();
    let request = app
        .service
        .submit(&app.student, financial_input(1_000, false))
        .await
        .unwrap();

    app.service.verify(&app.admin, request.id, false).await.unwrap();
    let err = app
        .service
        .verify(&app.admin, request.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_stats_and_listing_scope() {
    let app = test_app();
    app.backend.contribute(10_000).await.unwrap();

    let first = app
        .service
        .submit(&app.student, financial_input(1_000, false))
        .await
        .unwrap();
    app.service
        .submit(&app.student, financial_input(2_000, false))
        .await
        .unwrap();
    app.service.verify(&app.admin, first.id, false).await.unwrap();

    let stats = app.service.stats(&app.admin).await.unwrap();
    assert_eq!(stats.pending_admin, 1);
    assert_eq!(stats.second_approval_pending, 1);
    assert_eq!(stats.available_balance, 10_000);

    // Students see only their own requests.
    let listed = app.service.list(&app.student).await.unwrap();
    assert_eq!(listed.len(), 2);
    let other_student = RequestContext::new(UserId::new(), UserRole::Student, None);
    assert!(app.service.list(&other_student).await.unwrap().is_empty());
}
