// crates/rowledger-core/src/runtime/draft_queue.rs
// ============================================================================
// Module: Rowledger Draft Queue
// Description: In-memory queue of drafts awaiting human confirmation.
// Purpose: Hold pre-persistence drafts and watch for confirmation inactivity.
// Dependencies: crate::core, crate::interfaces, crate::runtime::repository
// ============================================================================

//! ## Overview
//! Drafts live only in process memory until saved; a restart loses them by
//! design. Queue membership and the last-activity timestamp are read and
//! written together under one mutex so a concurrent `preview` never races a
//! `save` or `discard` into a lost update; a draft mid-save is out of the
//! queue, so at most one caller ever persists it. Drafts are addressed by
//! the token issued on `preview`, never by content equality.
//!
//! The inactivity watcher is a background thread that emits one
//! notification per quiet period while drafts sit unconfirmed; it never
//! mutates the queue.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crate::core::identifiers::DraftToken;
use crate::core::record::ConfirmationStatus;
use crate::core::record::Draft;
use crate::core::record::Record;
use crate::interfaces::DraftQueueError;
use crate::interfaces::StoreAdapter;
use crate::runtime::repository::RecordRepository;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Topic applied to generated summary drafts.
pub const DRAFT_TOPICS: &str = "Workflow Automation";
/// Tags applied to generated summary drafts.
pub const DRAFT_TAGS: &str = "schema, workflow, validation";
/// Key-facts body used when preview content is empty.
pub const DRAFT_PLACEHOLDER: &str = "Default key facts placeholder";

// ============================================================================
// SECTION: Queue Types
// ============================================================================

/// A draft together with the token that addresses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedDraft {
    /// Queue-issued handle required by `save` and `discard`.
    pub token: DraftToken,
    /// Draft content snapshot.
    pub draft: Draft,
}

/// Notification emitted when drafts sit unconfirmed past the quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleAlert {
    /// Number of drafts pending confirmation.
    pub pending: usize,
    /// Time since the last queue-mutating operation.
    pub idle: Duration,
}

/// Receiver of inactivity notifications.
pub trait IdleAlertSink: Send + Sync {
    /// Handles one inactivity notification.
    fn notify(&self, alert: &IdleAlert);
}

/// Mutable queue state guarded by one mutex.
struct QueueState {
    /// Queued drafts in insertion order.
    drafts: Vec<QueuedDraft>,
    /// Instant of the last queue-mutating operation.
    last_activity: Instant,
    /// Whether the current quiet period has already been notified.
    idle_notified: bool,
    /// Next token value to issue.
    next_token: u64,
}

impl QueueState {
    /// Marks queue activity, rearming the inactivity watcher.
    fn touch(&mut self) {
        self.last_activity = Instant::now();
        self.idle_notified = false;
    }
}

// ============================================================================
// SECTION: Draft Queue
// ============================================================================

/// Ordered in-memory queue of drafts awaiting confirmation.
#[derive(Clone)]
pub struct DraftQueue {
    /// Shared queue state.
    state: Arc<Mutex<QueueState>>,
}

impl Default for DraftQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                drafts: Vec::new(),
                last_activity: Instant::now(),
                idle_notified: false,
                next_token: 1,
            })),
        }
    }

    /// Builds a summary draft from the given content and queues it.
    ///
    /// Empty content falls back to the placeholder body.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError::Internal`] when the queue lock is
    /// poisoned.
    pub fn preview(&self, content: &str) -> Result<QueuedDraft, DraftQueueError> {
        let draft = Draft {
            topics: DRAFT_TOPICS.to_string(),
            tags: DRAFT_TAGS.to_string(),
            key_facts: if content.trim().is_empty() {
                DRAFT_PLACEHOLDER.to_string()
            } else {
                content.to_string()
            },
        };
        let mut state = self.lock()?;
        let queued = QueuedDraft {
            token: DraftToken::new(state.next_token),
            draft,
        };
        state.next_token += 1;
        state.drafts.push(queued.clone());
        state.touch();
        Ok(queued)
    }

    /// Promotes a queued draft to a confirmed record.
    ///
    /// The draft is taken out of the queue under the lock before the store
    /// call, so a concurrent `save` or `discard` of the same token sees
    /// `NotFound` and the draft can never persist twice. The lock is not
    /// held across the store call; on persistence failure the draft is
    /// reinserted at its original position so nothing is silently lost.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError::NotFound`] when the token is not queued
    /// and [`DraftQueueError::Persist`] when the repository write fails.
    pub fn save<S: StoreAdapter>(
        &self,
        token: DraftToken,
        repository: &RecordRepository<S>,
    ) -> Result<Record, DraftQueueError> {
        let (index, queued) = {
            let mut state = self.lock()?;
            let index = state
                .drafts
                .iter()
                .position(|queued| queued.token == token)
                .ok_or(DraftQueueError::NotFound(token))?;
            let queued = state.drafts.remove(index);
            (index, queued)
        };
        match repository.create(queued.draft.to_new_record(ConfirmationStatus::Confirmed)) {
            Ok(record) => {
                self.lock()?.touch();
                Ok(record)
            }
            Err(err) => {
                let mut state = self.lock()?;
                let index = index.min(state.drafts.len());
                state.drafts.insert(index, queued);
                Err(DraftQueueError::Persist(err))
            }
        }
    }

    /// Removes a queued draft without persisting it.
    ///
    /// Never touches the durable store.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError::NotFound`] when the token is not queued.
    pub fn discard(&self, token: DraftToken) -> Result<Draft, DraftQueueError> {
        let mut state = self.lock()?;
        let index = state
            .drafts
            .iter()
            .position(|queued| queued.token == token)
            .ok_or(DraftQueueError::NotFound(token))?;
        let removed = state.drafts.remove(index);
        state.touch();
        Ok(removed.draft)
    }

    /// Returns a snapshot of the queue in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError::Internal`] when the queue lock is
    /// poisoned.
    pub fn list_pending(&self) -> Result<Vec<QueuedDraft>, DraftQueueError> {
        Ok(self.lock()?.drafts.clone())
    }

    /// Evaluates the inactivity condition at the given instant.
    ///
    /// Emits exactly one notification per quiet period: the first check
    /// past the threshold fires the sink, later checks stay silent until a
    /// mutating operation rearms the watcher. Returns whether a
    /// notification fired.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError::Internal`] when the queue lock is
    /// poisoned.
    pub fn check_idle(
        &self,
        now: Instant,
        quiet_period: Duration,
        sink: &dyn IdleAlertSink,
    ) -> Result<bool, DraftQueueError> {
        let alert = {
            let mut state = self.lock()?;
            let idle = now.saturating_duration_since(state.last_activity);
            if state.drafts.is_empty() || state.idle_notified || idle < quiet_period {
                None
            } else {
                state.idle_notified = true;
                Some(IdleAlert {
                    pending: state.drafts.len(),
                    idle,
                })
            }
        };
        match alert {
            Some(alert) => {
                sink.notify(&alert);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Locks the queue state, surfacing poisoning as an error.
    fn lock(&self) -> Result<MutexGuard<'_, QueueState>, DraftQueueError> {
        self.state
            .lock()
            .map_err(|_| DraftQueueError::Internal("draft queue mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Inactivity Watcher
// ============================================================================

/// Owning handle for the inactivity watcher thread.
pub struct IdleWatcher {
    /// Shutdown signal channel.
    shutdown: mpsc::Sender<()>,
    /// Join handle, taken exactly once on stop.
    join: Option<thread::JoinHandle<()>>,
}

impl IdleWatcher {
    /// Spawns the watcher thread over the given queue.
    ///
    /// The thread polls every `poll_interval` and notifies the sink when
    /// the queue has sat non-empty and untouched for `quiet_period`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftQueueError::Internal`] when the thread cannot be
    /// spawned.
    pub fn spawn(
        queue: DraftQueue,
        poll_interval: Duration,
        quiet_period: Duration,
        sink: Arc<dyn IdleAlertSink>,
    ) -> Result<Self, DraftQueueError> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name("rowledger-idle-watch".to_string())
            .spawn(move || {
                watch_loop(&queue, poll_interval, quiet_period, &shutdown_rx, sink.as_ref());
            })
            .map_err(|err| {
                DraftQueueError::Internal(format!("failed to spawn watcher thread: {err}"))
            })?;
        Ok(Self {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }

    /// Stops the watcher thread and waits for it to exit.
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

impl Drop for IdleWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Polls the idle condition until shutdown is signalled.
fn watch_loop(
    queue: &DraftQueue,
    poll_interval: Duration,
    quiet_period: Duration,
    shutdown: &mpsc::Receiver<()>,
    sink: &dyn IdleAlertSink,
) {
    loop {
        match shutdown.recv_timeout(poll_interval) {
            Err(RecvTimeoutError::Timeout) => {
                let _ = queue.check_idle(Instant::now(), quiet_period, sink);
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
