// crates/rowledger-store-sqlite/src/lib.rs
// ============================================================================
// Module: Rowledger SQLite Store Library
// Description: Durable store adapter backed by SQLite.
// Purpose: Expose the SQLite-backed positional row grid.
// Dependencies: rowledger-core, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate implements the durable tabular store contract over a local
//! `SQLite` database. Rows are stored as JSON cell arrays keyed by their
//! live position; deletions reindex within one transaction so positions
//! stay contiguous, matching the positional semantics the lifecycle engine
//! relies on.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteStoreAdapter;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
