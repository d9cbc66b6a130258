// crates/rowledger-proxy/src/service.rs
// ============================================================================
// Module: Proxy Service Facade
// Description: Composition root wiring stores, engine, audit, and tasks.
// Purpose: Expose the consumer-facing operations over the lifecycle engine.
// Dependencies: rowledger-core, rowledger-config, rowledger-providers,
//               rowledger-store-sqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! [`ProxyService`] is the single entry point a transport layer consumes.
//! `start` selects the store backend and credential source from
//! configuration, runs one sweep immediately so a restart never leaves
//! expired pending records lingering, then spawns the periodic sweeper and
//! the draft inactivity watcher. Every mutating operation emits one audit
//! event on success; reads stay silent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use rowledger_config::AuditSinkKind;
use rowledger_config::CredentialSource;
use rowledger_config::CredentialsConfig;
use rowledger_config::RowledgerConfig;
use rowledger_config::StoreBackend;
use rowledger_config::StoreConfig;
use rowledger_core::ConfirmationStatus;
use rowledger_core::CredentialProvider;
use rowledger_core::DayStamp;
use rowledger_core::Draft;
use rowledger_core::DraftQueue;
use rowledger_core::DraftQueueError;
use rowledger_core::DraftToken;
use rowledger_core::IdleWatcher;
use rowledger_core::InMemoryStoreAdapter;
use rowledger_core::NewRecord;
use rowledger_core::QueuedDraft;
use rowledger_core::Record;
use rowledger_core::RecordFilter;
use rowledger_core::RecordId;
use rowledger_core::RecordRepository;
use rowledger_core::RepositoryError;
use rowledger_core::SharedStoreAdapter;
use rowledger_core::StalenessSweeper;
use rowledger_core::SweepReport;
use rowledger_core::SweeperHandle;
use rowledger_core::SystemClock;
use rowledger_providers::EnvCredentialProvider;
use rowledger_providers::HttpGridConfig;
use rowledger_providers::HttpGridStoreAdapter;
use rowledger_providers::StaticCredentialProvider;
use rowledger_store_sqlite::SqliteStoreAdapter;
use rowledger_store_sqlite::SqliteStoreConfig;
use serde::Serialize;
use thiserror::Error;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::IdleAuditBridge;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::audit::SweepAuditBridge;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Service startup errors.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The store backend could not be initialized.
    #[error("store initialization failed: {0}")]
    Store(String),
    /// The credential source could not be initialized.
    #[error("credential initialization failed: {0}")]
    Credentials(String),
    /// The audit sink could not be initialized.
    #[error("audit initialization failed: {0}")]
    Audit(String),
    /// A background task could not be spawned.
    #[error("background task failed to start: {0}")]
    Task(String),
}

// ============================================================================
// SECTION: Health
// ============================================================================

/// Health check payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Service label.
    pub service: String,
    /// Liveness indicator.
    pub status: String,
    /// Current day as seen by the service clock.
    pub today: DayStamp,
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Consumer-facing facade over the record lifecycle engine.
pub struct ProxyService {
    /// Repository over the configured store backend.
    repository: Arc<RecordRepository<SharedStoreAdapter>>,
    /// In-memory draft confirmation queue.
    drafts: DraftQueue,
    /// Destination for audit events.
    audit: Arc<dyn AuditSink>,
    /// Pending-record TTL in days.
    ttl_days: u16,
    /// Periodic sweeper handle, present while the task runs.
    sweeper: Option<SweeperHandle>,
    /// Inactivity watcher handle, present while the task runs.
    watcher: Option<IdleWatcher>,
}

impl ProxyService {
    /// Starts the service from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when a backend, credential source, audit
    /// sink, or background task cannot be initialized.
    pub fn start(config: &RowledgerConfig) -> Result<Self, StartupError> {
        let audit = build_audit_sink(config)?;
        Self::start_with_sink(config, audit)
    }

    /// Starts the service with an explicit audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when a backend, credential source, or
    /// background task cannot be initialized.
    pub fn start_with_sink(
        config: &RowledgerConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, StartupError> {
        let store = build_store(&config.store, &config.credentials)?;
        let repository =
            Arc::new(RecordRepository::new(store, Arc::new(SystemClock)));
        let drafts = DraftQueue::new();
        audit.record(&AuditEvent::Started {
            backend: backend_label(config.store.backend).to_string(),
        });

        // One sweep at startup so expired pending records never outlive a
        // restart by a full interval.
        let startup_sweeper =
            StalenessSweeper::new(Arc::clone(&repository), config.sweeper.ttl_days);
        match startup_sweeper.sweep_once() {
            Ok(report) => audit.record(&AuditEvent::from_sweep(&report)),
            Err(err) => audit.record(&AuditEvent::SweepFailed {
                reason: err.to_string(),
            }),
        }

        let sweeper = if config.sweeper.enabled {
            let task_sweeper =
                StalenessSweeper::new(Arc::clone(&repository), config.sweeper.ttl_days);
            let handle = task_sweeper
                .spawn(
                    Duration::from_millis(config.sweeper.interval_ms),
                    Arc::new(SweepAuditBridge::new(Arc::clone(&audit))),
                )
                .map_err(|err| StartupError::Task(err.to_string()))?;
            Some(handle)
        } else {
            None
        };
        let watcher = if config.watcher.enabled {
            let handle = IdleWatcher::spawn(
                drafts.clone(),
                Duration::from_millis(config.watcher.poll_interval_ms),
                Duration::from_millis(config.watcher.quiet_period_ms),
                Arc::new(IdleAuditBridge::new(Arc::clone(&audit))),
            )
            .map_err(|err| StartupError::Task(err.to_string()))?;
            Some(handle)
        } else {
            None
        };

        Ok(Self {
            repository,
            drafts,
            audit,
            ttl_days: config.sweeper.ttl_days,
            sweeper,
            watcher,
        })
    }

    /// Lists records matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store read fails.
    pub fn list_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, RepositoryError> {
        self.repository.list(filter)
    }

    /// Creates a record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on validation or store failure.
    pub fn create_record(&self, new: NewRecord) -> Result<Record, RepositoryError> {
        let record = self.repository.create(new)?;
        self.audit.record(&AuditEvent::RecordCreated {
            id: record.id.as_u64(),
            status: record.status.as_label().to_string(),
        });
        Ok(record)
    }

    /// Changes a record's confirmation status.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the record is missing or the store
    /// write fails.
    pub fn update_status(
        &self,
        id: RecordId,
        status: ConfirmationStatus,
    ) -> Result<Record, RepositoryError> {
        let record = self.repository.update_status(id, status)?;
        self.audit.record(&AuditEvent::StatusChanged {
            id: record.id.as_u64(),
            status: record.status.as_label().to_string(),
        });
        Ok(record)
    }

    /// Hard-deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the record is missing or the store
    /// write fails.
    pub fn delete_record(&self, id: RecordId) -> Result<(), RepositoryError> {
        self.repository.delete(id)?;
        self.audit.record(&AuditEvent::RecordDeleted {
            id: id.as_u64(),
        });
        Ok(())
    }

    /// Queues a summary draft for confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError`] when the queue is unavailable.
    pub fn preview_draft(&self, content: &str) -> Result<QueuedDraft, DraftQueueError> {
        let queued = self.drafts.preview(content)?;
        self.audit.record(&AuditEvent::DraftQueued {
            token: queued.token.as_u64(),
        });
        Ok(queued)
    }

    /// Promotes a queued draft to a confirmed record.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError`] when the token is unknown or the store
    /// write fails; the draft stays queued on failure.
    pub fn save_draft(&self, token: DraftToken) -> Result<Record, DraftQueueError> {
        let record = self.drafts.save(token, &self.repository)?;
        self.audit.record(&AuditEvent::DraftSaved {
            token: token.as_u64(),
            id: record.id.as_u64(),
        });
        Ok(record)
    }

    /// Removes a queued draft without persisting it.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError`] when the token is unknown.
    pub fn discard_draft(&self, token: DraftToken) -> Result<Draft, DraftQueueError> {
        let draft = self.drafts.discard(token)?;
        self.audit.record(&AuditEvent::DraftDiscarded {
            token: token.as_u64(),
        });
        Ok(draft)
    }

    /// Returns the queued drafts in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError`] when the queue is unavailable.
    pub fn list_pending_drafts(&self) -> Result<Vec<QueuedDraft>, DraftQueueError> {
        self.drafts.list_pending()
    }

    /// Runs one sweep cycle immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the scan fails; per-record
    /// eviction failures are reported, not raised.
    pub fn cleanup_now(&self) -> Result<SweepReport, RepositoryError> {
        let sweeper = StalenessSweeper::new(Arc::clone(&self.repository), self.ttl_days);
        let report = sweeper.sweep_once()?;
        self.audit.record(&AuditEvent::from_sweep(&report));
        Ok(report)
    }

    /// Reports service liveness and the current service day.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport {
            service: "rowledger-proxy".to_string(),
            status: "ok".to_string(),
            today: self.repository.today(),
        }
    }

    /// Stops both background tasks and waits for them to exit.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.shutdown();
        }
        if let Some(handle) = self.watcher.take() {
            handle.shutdown();
        }
        self.audit.record(&AuditEvent::Shutdown);
    }
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Returns the audit label for a store backend.
const fn backend_label(backend: StoreBackend) -> &'static str {
    match backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Http => "http",
        StoreBackend::Sqlite => "sqlite",
    }
}

/// Builds the configured store backend behind the shared wrapper.
fn build_store(
    store: &StoreConfig,
    credentials: &CredentialsConfig,
) -> Result<SharedStoreAdapter, StartupError> {
    match store.backend {
        StoreBackend::Memory => Ok(SharedStoreAdapter::from_adapter(InMemoryStoreAdapter::new())),
        StoreBackend::Http => {
            let http = store.http.as_ref().ok_or_else(|| {
                StartupError::Store("http backend settings missing".to_string())
            })?;
            let provider = build_credential_provider(credentials)?;
            let adapter = HttpGridStoreAdapter::new(
                HttpGridConfig {
                    base_url: http.base_url.clone(),
                    allow_http: http.allow_http,
                    timeout_ms: http.timeout_ms,
                    max_response_bytes: http.max_response_bytes,
                    ..HttpGridConfig::default()
                },
                provider,
            )
            .map_err(|err| StartupError::Store(err.to_string()))?;
            Ok(SharedStoreAdapter::from_adapter(adapter))
        }
        StoreBackend::Sqlite => {
            let sqlite = store.sqlite.as_ref().ok_or_else(|| {
                StartupError::Store("sqlite backend settings missing".to_string())
            })?;
            let mut config = SqliteStoreConfig::new(sqlite.path.clone());
            config.busy_timeout_ms = sqlite.busy_timeout_ms;
            let adapter = SqliteStoreAdapter::open(&config)
                .map_err(|err| StartupError::Store(err.to_string()))?;
            Ok(SharedStoreAdapter::from_adapter(adapter))
        }
    }
}

/// Builds the configured credential provider.
fn build_credential_provider(
    credentials: &CredentialsConfig,
) -> Result<Arc<dyn CredentialProvider>, StartupError> {
    match credentials.source {
        CredentialSource::None => Err(StartupError::Credentials(
            "selected backend requires a credential source".to_string(),
        )),
        CredentialSource::Env => {
            let variable = credentials.env_variable.as_deref().ok_or_else(|| {
                StartupError::Credentials("env credential source missing variable".to_string())
            })?;
            Ok(Arc::new(EnvCredentialProvider::new(variable)))
        }
        CredentialSource::Static => {
            let token = credentials.static_token.as_deref().ok_or_else(|| {
                StartupError::Credentials("static credential source missing token".to_string())
            })?;
            Ok(Arc::new(StaticCredentialProvider::new(token)))
        }
    }
}

/// Builds the configured audit sink.
fn build_audit_sink(config: &RowledgerConfig) -> Result<Arc<dyn AuditSink>, StartupError> {
    match config.audit.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
        AuditSinkKind::File => {
            let path = config.audit.path.as_deref().ok_or_else(|| {
                StartupError::Audit("file audit sink missing path".to_string())
            })?;
            let sink = FileAuditSink::open(path)
                .map_err(|err| StartupError::Audit(err.to_string()))?;
            Ok(Arc::new(sink))
        }
    }
}
