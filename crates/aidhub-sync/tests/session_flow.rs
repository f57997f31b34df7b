//! Integration tests for the full sync loop: services publishing events,
//! a loopback push channel, and per-session stores reconciling them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use aidhub_core::config::AppConfig;
use aidhub_core::types::{UniversityId, UserId};
use aidhub_core::{AppError, AppResult};
use aidhub_entity::aid_request::{AidCategory, AidStatus};
use aidhub_entity::notification::RecipientType;
use aidhub_entity::user::{User, UserRole};
use aidhub_service::dto::{SendNotification, SubmitAidRequest};
use aidhub_service::gateway::LedgerGateway;
use aidhub_service::notification::RecipientResolver;
use aidhub_service::{
    AidRequestService, BroadcastPublisher, DisbursementGuard, MemoryBackend, NotificationService,
    RequestContext,
};
use aidhub_sync::{ChannelStatus, ChannelTransport, SyncRefresher, SyncSession, SyncStore};

/// Transport that replays the publisher's broadcast as raw JSON frames,
/// the way the remote push channel would.
struct LoopbackTransport {
    publisher: Arc<BroadcastPublisher>,
}

#[async_trait]
impl ChannelTransport for LoopbackTransport {
    async fn connect(&self, _credential: &str) -> AppResult<mpsc::Receiver<String>> {
        let mut events = self.publisher.subscribe();
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            while let Ok(envelope) = events.recv().await {
                let Ok(raw) = serde_json::to_string(&envelope) else {
                    continue;
                };
                if tx.send(raw).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

/// Transport whose connections always fail.
struct DeadTransport;

#[async_trait]
impl ChannelTransport for DeadTransport {
    async fn connect(&self, _credential: &str) -> AppResult<mpsc::Receiver<String>> {
        Err(AppError::transport("connection refused"))
    }
}

/// Transport that connects but never delivers anything.
#[derive(Default)]
struct IdleTransport {
    keep_alive: Mutex<Vec<mpsc::Sender<String>>>,
}

#[async_trait]
impl ChannelTransport for IdleTransport {
    async fn connect(&self, _credential: &str) -> AppResult<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(8);
        self.keep_alive.lock().unwrap().push(tx);
        Ok(rx)
    }
}

struct TestApp {
    backend: Arc<MemoryBackend>,
    publisher: Arc<BroadcastPublisher>,
    requests: Arc<AidRequestService>,
    notifications: Arc<NotificationService>,
    admin: RequestContext,
    student: RequestContext,
}

fn test_app() -> TestApp {
    let backend = Arc::new(MemoryBackend::new());
    let publisher = Arc::new(BroadcastPublisher::new(64));
    let guard = DisbursementGuard::new(backend.clone());
    let requests = Arc::new(AidRequestService::new(
        backend.clone(),
        guard,
        publisher.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(
        backend.clone(),
        RecipientResolver::new(backend.clone()),
        publisher.clone(),
    ));

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
        publisher,
        requests,
        notifications,
        admin: RequestContext::for_user(&admin_user),
        student: RequestContext::for_user(&student_user),
    }
}

fn session_for(app: &TestApp, ctx: &RequestContext) -> SyncSession {
    let mut config = AppConfig::default();
    // Keep the periodic refresh out of the way; events drive these tests
    // and the initial tick still runs once.
    config.sync.refresh_interval_seconds = 3_600;

    let store = Arc::new(SyncStore::new(ctx.user_id));
    let refresher = Arc::new(SyncRefresher::new(
        ctx.clone(),
        app.notifications.clone(),
        app.requests.clone(),
        store.clone(),
    ));
    let transport = Arc::new(LoopbackTransport {
        publisher: app.publisher.clone(),
    });
    SyncSession::start(&config, "session-token", transport, refresher, store)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lifecycle_events_reach_every_session() {
    let app = test_app();
    app.backend.contribute(3_000).await.unwrap();

    let student_session = session_for(&app, &app.student);
    let admin_session = session_for(&app, &app.admin);
    settle().await;
    assert_eq!(student_session.channel_status(), ChannelStatus::Connected);

    // Student submits; both sessions converge on the new request.
    let request = app
        .requests
        .submit(
            &app.student,
            SubmitAidRequest {
                category: AidCategory::Financial,
                amount: Some(5_000),
                items: Vec::new(),
                reason: "emergency housing".to_string(),
                emergency: false,
            },
        )
        .await
        .unwrap();
    settle().await;

    let student_store = student_session.store();
    let admin_store = admin_session.store();
    assert_eq!(student_store.requests().len(), 1);
    assert_eq!(admin_store.requests().len(), 1);
    assert_eq!(admin_store.stats().pending_admin, 1);

    // Verify, then final-approve against an underfunded pool.
    app.requests
        .verify(&app.admin, request.id, false)
        .await
        .unwrap();
    app.requests
        .final_approve(&app.admin, request.id)
        .await
        .unwrap();
    settle().await;

    assert_eq!(
        student_store.requests()[0].status,
        AidStatus::WaitingFunds
    );
    assert_eq!(admin_store.stats().waiting_funds, 1);
    assert_eq!(admin_store.stats().available_balance, 3_000);

    // A donor tops up; the recheck disburses and every session sees it.
    app.backend.contribute(3_000).await.unwrap();
    app.requests
        .recheck_funds(&app.admin, request.id)
        .await
        .unwrap();
    settle().await;

    assert_eq!(student_store.requests()[0].status, AidStatus::Disbursed);
    assert_eq!(admin_store.stats().disbursed, 1);
    assert_eq!(admin_store.stats().available_balance, 1_000);

    student_session.shutdown().await;
    admin_session.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_notification_read_state_flows_to_the_reader_only() {
    let app = test_app();

    let student_session = session_for(&app, &app.student);
    let admin_session = session_for(&app, &app.admin);
    settle().await;

    app.notifications
        .send(
            &app.admin,
            SendNotification {
                title: "Document check".to_string(),
                message: "Please upload your enrollment certificate.".to_string(),
                recipient_type: RecipientType::Individual,
                recipients: vec![app.student.user_id],
            },
        )
        .await
        .unwrap();
    settle().await;

    let student_store = student_session.store();
    let admin_store = admin_session.store();
    assert_eq!(student_store.feed().len(), 1);
    assert_eq!(student_store.unread_count(), 1);
    // The admin sent it; it lands in their sent list, not their feed.
    assert!(admin_store.feed().is_empty());
    assert_eq!(admin_store.sent().len(), 1);

    let notification_id = student_store.feed()[0].id;
    app.notifications
        .mark_read(&app.student, notification_id)
        .await
        .unwrap();
    settle().await;

    assert_eq!(student_store.unread_count(), 0);
    assert!(student_store.feed()[0].is_read_by(&app.student.user_id));

    student_session.shutdown().await;
    admin_session.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_initial_refresh_pulls_existing_state() {
    let app = test_app();
    app.backend.contribute(2_000).await.unwrap();

    // State exists before the session ever connects.
    app.requests
        .submit(
            &app.student,
            SubmitAidRequest {
                category: AidCategory::Financial,
                amount: Some(1_000),
                items: Vec::new(),
                reason: "textbooks".to_string(),
                emergency: false,
            },
        )
        .await
        .unwrap();
    app.notifications
        .send(
            &app.admin,
            SendNotification {
                title: "Welcome".to_string(),
                message: "Your account is ready.".to_string(),
                recipient_type: RecipientType::Individual,
                recipients: vec![app.student.user_id],
            },
        )
        .await
        .unwrap();

    let mut config = AppConfig::default();
    config.sync.refresh_interval_seconds = 3_600;
    let store = Arc::new(SyncStore::new(app.student.user_id));
    let refresher = Arc::new(SyncRefresher::new(
        app.student.clone(),
        app.notifications.clone(),
        app.requests.clone(),
        store.clone(),
    ));
    let session = SyncSession::start(
        &config,
        "session-token",
        Arc::new(IdleTransport::default()),
        refresher,
        store,
    );
    settle().await;

    let store = session.store();
    assert_eq!(store.requests().len(), 1);
    assert_eq!(store.feed().len(), 1);
    assert_eq!(store.unread_count(), 1);
    assert_eq!(store.stats().pending_admin, 1);
    assert_eq!(store.channel_status(), ChannelStatus::Connected);

    session.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exhausted_reconnects_surface_offline() {
    let app = test_app();

    let mut config = AppConfig::default();
    config.channel.reconnect_base_delay_ms = 1;
    config.channel.reconnect_max_delay_ms = 2;
    config.channel.max_reconnect_attempts = 3;
    config.sync.refresh_interval_seconds = 3_600;

    let store = Arc::new(SyncStore::new(app.student.user_id));
    let refresher = Arc::new(SyncRefresher::new(
        app.student.clone(),
        app.notifications.clone(),
        app.requests.clone(),
        store.clone(),
    ));
    let session = SyncSession::start(
        &config,
        "session-token",
        Arc::new(DeadTransport),
        refresher,
        store,
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.channel_status(), ChannelStatus::Offline);

    session.shutdown().await;
}
