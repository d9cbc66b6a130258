// crates/rowledger-core/src/runtime/sweeper.rs
// ============================================================================
// Module: Rowledger Staleness Sweeper
// Description: TTL-based eviction of records stuck in the pending state.
// Purpose: Enforce the pending-record time-to-live on a periodic cycle.
// Dependencies: crate::core, crate::interfaces, crate::runtime::repository
// ============================================================================

//! ## Overview
//! The sweeper scans every record and hard-deletes those still `pending`
//! once their age meets the TTL. Each eviction is independent: one failed
//! delete is reported and skipped, never fatal to the cycle. A cycle run
//! twice against the same state produces no additional effect, and
//! confirmed records are never evicted regardless of age.
//!
//! The periodic trigger is a background thread with an explicit shutdown
//! path; tests drive [`StalenessSweeper::sweep_once`] directly instead of
//! waiting on wall-clock timers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use crate::core::filter::RecordFilter;
use crate::core::identifiers::RecordId;
use crate::interfaces::RepositoryError;
use crate::interfaces::StoreAdapter;
use crate::runtime::repository::RecordRepository;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default pending-record time-to-live in days.
pub const DEFAULT_TTL_DAYS: u16 = 7;

// ============================================================================
// SECTION: Sweep Report
// ============================================================================

/// One record the sweeper could not evict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    /// Identifier of the record that resisted eviction.
    pub id: RecordId,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of a single sweep cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of records examined.
    pub examined: usize,
    /// Identifiers of records evicted this cycle.
    pub evicted: Vec<RecordId>,
    /// Per-record eviction failures, logged and skipped.
    pub failed: Vec<SweepFailure>,
}

/// Observer notified after every periodic sweep cycle.
pub trait SweepSink: Send + Sync {
    /// Records the outcome of a completed cycle.
    fn record(&self, report: &SweepReport);

    /// Records a cycle that could not run at all (store read failure).
    fn cycle_failed(&self, _reason: &str) {}
}

/// Sink that ignores sweep outcomes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSweepSink;

impl SweepSink for NoopSweepSink {
    fn record(&self, _report: &SweepReport) {}
}

// ============================================================================
// SECTION: Sweeper
// ============================================================================

/// Periodic TTL enforcement over a [`RecordRepository`].
pub struct StalenessSweeper<S> {
    /// Repository used for scans and deletions.
    repository: Arc<RecordRepository<S>>,
    /// Pending-record time-to-live in days.
    ttl_days: u16,
}

impl<S: StoreAdapter> StalenessSweeper<S> {
    /// Creates a sweeper with the given TTL.
    #[must_use]
    pub fn new(repository: Arc<RecordRepository<S>>, ttl_days: u16) -> Self {
        Self {
            repository,
            ttl_days,
        }
    }

    /// Runs one sweep cycle against the current store snapshot.
    ///
    /// A record already deleted by a concurrent writer counts as neither
    /// evicted nor failed; the row is simply gone.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] only when the initial scan fails; from
    /// that point on, per-record failures are collected in the report.
    pub fn sweep_once(&self) -> Result<SweepReport, RepositoryError> {
        let today = self.repository.today();
        let records = self.repository.list(&RecordFilter::all())?;
        let mut report = SweepReport {
            examined: records.len(),
            ..SweepReport::default()
        };
        for record in records {
            let age_days = record.last_updated.days_until(today);
            if !record.status.is_pending() || age_days < i64::from(self.ttl_days) {
                continue;
            }
            match self.repository.delete(record.id) {
                Ok(()) => report.evicted.push(record.id),
                Err(RepositoryError::NotFound(_)) => {}
                Err(err) => report.failed.push(SweepFailure {
                    id: record.id,
                    reason: err.to_string(),
                }),
            }
        }
        Ok(report)
    }
}

impl<S: StoreAdapter + 'static> StalenessSweeper<S> {
    /// Spawns the periodic sweep thread.
    ///
    /// The thread runs one cycle every `interval` until the returned handle
    /// is shut down or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Upstream`] when the thread cannot be
    /// spawned.
    pub fn spawn(
        self,
        interval: Duration,
        sink: Arc<dyn SweepSink>,
    ) -> Result<SweeperHandle, RepositoryError> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name("rowledger-sweeper".to_string())
            .spawn(move || {
                sweep_loop(&self, interval, &shutdown_rx, sink.as_ref());
            })
            .map_err(|err| {
                RepositoryError::Upstream(format!("failed to spawn sweeper thread: {err}"))
            })?;
        Ok(SweeperHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

/// Runs sweep cycles until shutdown is signalled.
fn sweep_loop<S: StoreAdapter>(
    sweeper: &StalenessSweeper<S>,
    interval: Duration,
    shutdown: &mpsc::Receiver<()>,
    sink: &dyn SweepSink,
) {
    loop {
        match shutdown.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => match sweeper.sweep_once() {
                Ok(report) => sink.record(&report),
                Err(err) => sink.cycle_failed(&err.to_string()),
            },
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

// ============================================================================
// SECTION: Lifecycle Handle
// ============================================================================

/// Owning handle for the periodic sweep thread.
pub struct SweeperHandle {
    /// Shutdown signal channel.
    shutdown: mpsc::Sender<()>,
    /// Join handle, taken exactly once on stop.
    join: Option<thread::JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stops the sweep thread and waits for it to exit.
    pub fn shutdown(self) {
        drop(self);
    }

    /// Signals shutdown and joins the thread.
    fn stop(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.shutdown.send(());
            let _ = join.join();
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
