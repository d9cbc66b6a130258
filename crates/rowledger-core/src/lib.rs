// crates/rowledger-core/src/lib.rs
// ============================================================================
// Module: Rowledger Core Library
// Description: Public API surface for the Rowledger lifecycle engine.
// Purpose: Expose core types, interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Rowledger core is the record lifecycle engine behind a proxy over a
//! durable, append-only tabular store: the confirmation-status state
//! machine, the staleness-based eviction sweeper, and the in-memory
//! pending-draft queue with its inactivity watcher. Storage, credentials,
//! and time are reached through explicit interfaces so the engine stays
//! backend-agnostic and deterministic under test.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AuthError;
pub use interfaces::Clock;
pub use interfaces::CredentialProvider;
pub use interfaces::DraftQueueError;
pub use interfaces::FixedClock;
pub use interfaces::RepositoryError;
pub use interfaces::ServiceToken;
pub use interfaces::StoreAdapter;
pub use interfaces::StoreError;
pub use interfaces::SystemClock;
pub use runtime::DraftQueue;
pub use runtime::IdleAlert;
pub use runtime::IdleAlertSink;
pub use runtime::IdleWatcher;
pub use runtime::InMemoryStoreAdapter;
pub use runtime::QueuedDraft;
pub use runtime::RecordRepository;
pub use runtime::SharedStoreAdapter;
pub use runtime::StalenessSweeper;
pub use runtime::SweepFailure;
pub use runtime::SweepReport;
pub use runtime::SweepSink;
pub use runtime::SweeperHandle;
