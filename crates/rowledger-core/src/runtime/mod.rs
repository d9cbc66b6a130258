// crates/rowledger-core/src/runtime/mod.rs
// ============================================================================
// Module: Rowledger Runtime
// Description: Lifecycle engine built on the core model and interfaces.
// Purpose: Group the repository, sweeper, draft queue, and test store.
// Dependencies: crate::{core, interfaces}, runtime submodules
// ============================================================================

//! ## Overview
//! The runtime holds the behavior of the proxy core: CRUD through the
//! repository, TTL eviction through the sweeper, and the in-memory draft
//! queue with its inactivity watcher. Each periodic task owns an explicit
//! spawn/shutdown lifecycle so tests can drive single cycles directly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod draft_queue;
pub mod repository;
pub mod store;
pub mod sweeper;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use draft_queue::DRAFT_PLACEHOLDER;
pub use draft_queue::DRAFT_TAGS;
pub use draft_queue::DRAFT_TOPICS;
pub use draft_queue::DraftQueue;
pub use draft_queue::IdleAlert;
pub use draft_queue::IdleAlertSink;
pub use draft_queue::IdleWatcher;
pub use draft_queue::QueuedDraft;
pub use repository::RecordRepository;
pub use store::InMemoryStoreAdapter;
pub use store::SharedStoreAdapter;
pub use sweeper::DEFAULT_TTL_DAYS;
pub use sweeper::NoopSweepSink;
pub use sweeper::StalenessSweeper;
pub use sweeper::SweepFailure;
pub use sweeper::SweepReport;
pub use sweeper::SweepSink;
pub use sweeper::SweeperHandle;
