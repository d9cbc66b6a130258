// crates/rowledger-proxy/src/audit.rs
// ============================================================================
// Module: Audit Events and Sinks
// Description: Structured audit events for record lifecycle operations.
// Purpose: Route lifecycle observations as JSON lines without a log framework.
// Dependencies: rowledger-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every externally visible mutation and every background cycle produces
//! one audit event, serialized as a single JSON line. Sinks are
//! best-effort: an audit write failure never fails the operation that
//! produced the event. Record content beyond identifiers and status labels
//! is never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use rowledger_core::IdleAlert;
use rowledger_core::IdleAlertSink;
use rowledger_core::SweepReport;
use rowledger_core::SweepSink;
use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// One structured audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// The service finished wiring and is accepting operations.
    Started {
        /// Configured store backend label.
        backend: String,
    },
    /// A record was created.
    RecordCreated {
        /// Assigned record identifier.
        id: u64,
        /// Confirmation status label at creation.
        status: String,
    },
    /// A record's confirmation status changed.
    StatusChanged {
        /// Target record identifier.
        id: u64,
        /// New confirmation status label.
        status: String,
    },
    /// A record was hard-deleted.
    RecordDeleted {
        /// Deleted record identifier.
        id: u64,
    },
    /// A draft entered the confirmation queue.
    DraftQueued {
        /// Queue-issued draft token.
        token: u64,
    },
    /// A draft was promoted to a confirmed record.
    DraftSaved {
        /// Promoted draft token.
        token: u64,
        /// Identifier of the resulting record.
        id: u64,
    },
    /// A draft was removed without being persisted.
    DraftDiscarded {
        /// Discarded draft token.
        token: u64,
    },
    /// A sweep cycle completed.
    SweepCompleted {
        /// Number of records examined.
        examined: usize,
        /// Identifiers evicted this cycle.
        evicted: Vec<u64>,
        /// Number of per-record eviction failures.
        failed: usize,
    },
    /// A sweep cycle could not run at all.
    SweepFailed {
        /// Failure reason.
        reason: String,
    },
    /// Drafts sat unconfirmed past the quiet period.
    IdleDrafts {
        /// Number of drafts pending confirmation.
        pending: usize,
        /// Idle time in milliseconds.
        idle_ms: u64,
    },
    /// The service stopped its background tasks.
    Shutdown,
}

impl AuditEvent {
    /// Builds the sweep-completed event from a cycle report.
    #[must_use]
    pub fn from_sweep(report: &SweepReport) -> Self {
        Self::SweepCompleted {
            examined: report.examined,
            evicted: report.evicted.iter().map(|id| id.as_u64()).collect(),
            failed: report.failed.len(),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Receiver of audit events.
pub trait AuditSink: Send + Sync {
    /// Records one audit event; failures are swallowed by the sink.
    fn record(&self, event: &AuditEvent);
}

/// Sink writing JSON lines to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Sink appending JSON lines to a file.
pub struct FileAuditSink {
    /// Append-only log file, serialized by a mutex.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the log file in append mode, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        let Ok(line) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

// ============================================================================
// SECTION: Background Task Bridges
// ============================================================================

/// Bridges sweep cycle outcomes onto the audit sink.
pub struct SweepAuditBridge {
    /// Destination sink.
    sink: Arc<dyn AuditSink>,
}

impl SweepAuditBridge {
    /// Creates a bridge forwarding to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
        }
    }
}

impl SweepSink for SweepAuditBridge {
    fn record(&self, report: &SweepReport) {
        self.sink.record(&AuditEvent::from_sweep(report));
    }

    fn cycle_failed(&self, reason: &str) {
        self.sink.record(&AuditEvent::SweepFailed {
            reason: reason.to_string(),
        });
    }
}

/// Bridges draft inactivity alerts onto the audit sink.
pub struct IdleAuditBridge {
    /// Destination sink.
    sink: Arc<dyn AuditSink>,
}

impl IdleAuditBridge {
    /// Creates a bridge forwarding to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
        }
    }
}

impl IdleAlertSink for IdleAuditBridge {
    fn notify(&self, alert: &IdleAlert) {
        self.sink.record(&AuditEvent::IdleDrafts {
            pending: alert.pending,
            idle_ms: duration_ms(alert.idle),
        });
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
