// crates/rowledger-core/src/core/identifiers.rs
// ============================================================================
// Module: Rowledger Identifiers
// Description: Canonical identifiers for persisted records and queued drafts.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the two identifier kinds used throughout Rowledger.
//! Record identifiers come from the durable store (`max(existing) + 1` at
//! creation); draft tokens are issued by the in-memory queue
//! and are meaningless outside the process that created them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of a persisted record.
///
/// # Invariants
/// - Values are positive; `0` is never assigned by the repository.
/// - Identifiers are unique among live records; assignment is always one
///   past the current maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates a new record identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the identifier as a plain integer.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Handle for a draft queued in memory.
///
/// Tokens are issued by the queue on `preview` and are required by `save`
/// and `discard`, so two drafts with identical content remain
/// distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftToken(u64);

impl DraftToken {
    /// Creates a new draft token.
    #[must_use]
    pub const fn new(token: u64) -> Self {
        Self(token)
    }

    /// Returns the token as a plain integer.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DraftToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for DraftToken {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
