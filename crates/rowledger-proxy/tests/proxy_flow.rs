// crates/rowledger-proxy/tests/proxy_flow.rs
// ============================================================================
// Module: Proxy Flow Tests
// Description: End-to-end tests of the service facade over real backends.
// ============================================================================
//! ## Overview
//! Drives the full consumer surface through [`ProxyService`]: record CRUD,
//! the draft confirmation workflow, manual cleanup, health, audit event
//! emission, and backend wiring for both the in-memory and `SQLite`
//! stores.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use rowledger_config::AuditSinkKind;
use rowledger_config::RowledgerConfig;
use rowledger_config::SqliteBackendConfig;
use rowledger_config::StoreBackend;
use rowledger_core::ConfirmationStatus;
use rowledger_core::DraftQueueError;
use rowledger_core::NewRecord;
use rowledger_core::RecordFilter;
use rowledger_core::RepositoryError;
use rowledger_proxy::AuditEvent;
use rowledger_proxy::AuditSink;
use rowledger_proxy::ProxyService;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

fn memory_config() -> RowledgerConfig {
    let mut config = RowledgerConfig::default();
    config.audit.sink = AuditSinkKind::None;
    config
}

fn new_record(topics: &str) -> NewRecord {
    NewRecord {
        topics: topics.to_string(),
        tags: "tag".to_string(),
        key_facts: "facts".to_string(),
        status: None,
    }
}

/// Sink that collects every audit event.
#[derive(Default)]
struct CollectingAudit(Mutex<Vec<AuditEvent>>);

impl CollectingAudit {
    fn events(&self) -> Vec<AuditEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl AuditSink for CollectingAudit {
    fn record(&self, event: &AuditEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Record Operations
// ============================================================================

#[test]
fn record_crud_round_trips_through_the_facade() {
    let mut service = ProxyService::start(&memory_config()).unwrap();

    let created = service.create_record(new_record("alpha")).unwrap();
    assert_eq!(created.status, ConfirmationStatus::Pending);

    let confirmed =
        service.update_status(created.id, ConfirmationStatus::Confirmed).unwrap();
    assert_eq!(confirmed.status, ConfirmationStatus::Confirmed);

    let listed = service.list_records(&RecordFilter::all()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, ConfirmationStatus::Confirmed);

    service.delete_record(created.id).unwrap();
    assert!(service.list_records(&RecordFilter::all()).unwrap().is_empty());
    match service.delete_record(created.id) {
        Err(RepositoryError::NotFound(id)) => assert_eq!(id, created.id),
        other => panic!("expected not found, got {other:?}"),
    }
    service.shutdown();
}

#[test]
fn filtered_listing_passes_through() {
    let mut service = ProxyService::start(&memory_config()).unwrap();
    service.create_record(new_record("alpha")).unwrap();
    service.create_record(new_record("beta")).unwrap();
    let filter = RecordFilter {
        topic: Some("beta".to_string()),
        ..RecordFilter::all()
    };
    let listed = service.list_records(&filter).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].topics, "beta");
    service.shutdown();
}

// ============================================================================
// SECTION: Draft Workflow
// ============================================================================

#[test]
fn draft_preview_save_flow_creates_a_confirmed_record() {
    let mut service = ProxyService::start(&memory_config()).unwrap();

    let queued = service.preview_draft("session summary").unwrap();
    assert_eq!(service.list_pending_drafts().unwrap().len(), 1);

    let record = service.save_draft(queued.token).unwrap();
    assert_eq!(record.status, ConfirmationStatus::Confirmed);
    assert_eq!(record.key_facts, "session summary");
    assert!(service.list_pending_drafts().unwrap().is_empty());

    let listed = service.list_records(&RecordFilter::all()).unwrap();
    assert_eq!(listed, vec![record]);
    service.shutdown();
}

#[test]
fn draft_discard_flow_leaves_the_store_untouched() {
    let mut service = ProxyService::start(&memory_config()).unwrap();

    let queued = service.preview_draft("throwaway").unwrap();
    let draft = service.discard_draft(queued.token).unwrap();
    assert_eq!(draft.key_facts, "throwaway");
    assert!(service.list_pending_drafts().unwrap().is_empty());
    assert!(service.list_records(&RecordFilter::all()).unwrap().is_empty());

    match service.save_draft(queued.token) {
        Err(DraftQueueError::NotFound(token)) => assert_eq!(token, queued.token),
        other => panic!("expected not found, got {other:?}"),
    }
    service.shutdown();
}

// ============================================================================
// SECTION: Cleanup and Health
// ============================================================================

#[test]
fn cleanup_now_reports_without_evicting_fresh_records() {
    let mut service = ProxyService::start(&memory_config()).unwrap();
    service.create_record(new_record("alpha")).unwrap();
    let report = service.cleanup_now().unwrap();
    assert_eq!(report.examined, 1);
    assert!(report.evicted.is_empty());
    assert!(report.failed.is_empty());
    service.shutdown();
}

#[test]
fn health_reports_the_service_label() {
    let mut service = ProxyService::start(&memory_config()).unwrap();
    let health = service.health();
    assert_eq!(health.service, "rowledger-proxy");
    assert_eq!(health.status, "ok");
    service.shutdown();
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

#[test]
fn mutations_emit_one_audit_event_each() {
    let audit = Arc::new(CollectingAudit::default());
    let mut service = ProxyService::start_with_sink(
        &memory_config(),
        Arc::clone(&audit) as Arc<dyn AuditSink>,
    )
    .unwrap();

    let created = service.create_record(new_record("alpha")).unwrap();
    service.update_status(created.id, ConfirmationStatus::Confirmed).unwrap();
    service.delete_record(created.id).unwrap();
    let queued = service.preview_draft("x").unwrap();
    service.save_draft(queued.token).unwrap();
    service.shutdown();

    let events = audit.events();
    // Startup emits Started plus the initial sweep report.
    assert!(matches!(events[0], AuditEvent::Started { ref backend } if backend == "memory"));
    assert!(matches!(events[1], AuditEvent::SweepCompleted { examined: 0, .. }));
    assert!(matches!(events[2], AuditEvent::RecordCreated { id: 1, .. }));
    assert!(matches!(events[3], AuditEvent::StatusChanged { id: 1, .. }));
    assert!(matches!(events[4], AuditEvent::RecordDeleted { id: 1 }));
    assert!(matches!(events[5], AuditEvent::DraftQueued { token: 1 }));
    assert!(matches!(events[6], AuditEvent::DraftSaved { token: 1, .. }));
    assert!(matches!(events.last(), Some(AuditEvent::Shutdown)));
}

#[test]
fn reads_emit_no_audit_events() {
    let audit = Arc::new(CollectingAudit::default());
    let service = ProxyService::start_with_sink(
        &memory_config(),
        Arc::clone(&audit) as Arc<dyn AuditSink>,
    )
    .unwrap();
    let baseline = audit.events().len();
    service.list_records(&RecordFilter::all()).unwrap();
    service.list_pending_drafts().unwrap();
    let _ = service.health();
    assert_eq!(audit.events().len(), baseline);
    drop(service);
}

// ============================================================================
// SECTION: Backend Wiring
// ============================================================================

#[test]
fn sqlite_backend_persists_across_service_restarts() {
    let dir = TempDir::new().unwrap();
    let mut config = memory_config();
    config.store.backend = StoreBackend::Sqlite;
    config.store.sqlite = Some(SqliteBackendConfig {
        path: dir.path().join("grid.db"),
        busy_timeout_ms: 5_000,
    });
    config.validate().unwrap();

    let mut service = ProxyService::start(&config).unwrap();
    let created = service.create_record(new_record("durable")).unwrap();
    service.shutdown();
    drop(service);

    let mut service = ProxyService::start(&config).unwrap();
    let listed = service.list_records(&RecordFilter::all()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].topics, "durable");
    service.shutdown();
}

#[test]
fn startup_fails_closed_on_missing_backend_settings() {
    let mut config = memory_config();
    config.store.backend = StoreBackend::Sqlite;
    assert!(ProxyService::start(&config).is_err());
}
