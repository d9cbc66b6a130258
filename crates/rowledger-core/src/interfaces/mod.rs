// crates/rowledger-core/src/interfaces/mod.rs
// ============================================================================
// Module: Rowledger Interfaces
// Description: Backend-agnostic seams for storage, credentials, and time.
// Purpose: Define the contract surfaces used by the lifecycle engine.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the lifecycle engine reaches external systems
//! without embedding backend details. Implementations must be fail-closed:
//! every call carries a bounded timeout and surfaces an error rather than
//! blocking indefinitely or retrying silently. Row indices are positions in
//! the live store at call time, not stable identifiers; callers re-resolve
//! positions immediately before every mutating call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::identifiers::DraftToken;
use crate::core::identifiers::RecordId;
use crate::core::time::DayStamp;

// ============================================================================
// SECTION: Store Adapter
// ============================================================================

/// Store adapter errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable store could not be reached or timed out.
    #[error("durable store unavailable: {0}")]
    Unavailable(String),
    /// The request was malformed for the live store state.
    #[error("invalid store request: {0}")]
    Invalid(String),
    /// Credential retrieval for the store session failed.
    #[error("store credential failure: {0}")]
    Auth(String),
}

/// Uniform interface to the durable tabular store.
///
/// # Invariants
/// - `read_all` returns every row in order, including the header row at
///   position zero; provisioning owns the header, not the engine.
/// - Row indices refer to live positions at call time and shift after any
///   deletion.
pub trait StoreAdapter: Send + Sync {
    /// Reads every row of the store in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read; partial reads
    /// are never returned.
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// Appends one row after the last live row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the append does not complete.
    fn append(&self, row: &[String]) -> Result<(), StoreError>;

    /// Overwrites a single cell at a live row position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the position is out of range or the
    /// write does not complete.
    fn update_cell(&self, row_index: usize, column: usize, value: &str) -> Result<(), StoreError>;

    /// Removes the half-open row range `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the range is out of bounds or the
    /// removal does not complete.
    fn delete_rows(&self, start: usize, end: usize) -> Result<(), StoreError>;

    /// Blanks every cell in the half-open row range `[start, end)` without
    /// removing the rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the range is out of bounds or the write
    /// does not complete.
    fn clear_rows(&self, start: usize, end: usize) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Credential Provider
// ============================================================================

/// Credential retrieval errors.
#[derive(Debug, Error)]
#[error("credential retrieval failed: {0}")]
pub struct AuthError(pub String);

/// Opaque authorization material for a store session.
pub struct ServiceToken {
    /// Secret token value.
    secret: String,
}

impl ServiceToken {
    /// Wraps a secret token value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Returns the secret for use in an outbound request.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceToken(redacted)")
    }
}

/// Supplier of store session credentials.
///
/// Implementations are consulted once per store session; failures are fatal
/// to the current operation and never retried automatically.
pub trait CredentialProvider: Send + Sync {
    /// Retrieves the session credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the credential cannot be produced.
    fn credentials(&self) -> Result<ServiceToken, AuthError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current calendar day.
///
/// The engine never reads wall-clock time directly; repositories and the
/// sweeper take today's date through this seam so TTL behavior is
/// deterministic under test.
pub trait Clock: Send + Sync {
    /// Returns the current day in UTC.
    fn today(&self) -> DayStamp;
}

/// Wall-clock backed [`Clock`] for production wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DayStamp {
        DayStamp::from_date(OffsetDateTime::now_utc().date())
    }
}

/// Fixed [`Clock`] for tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DayStamp);

impl Clock for FixedClock {
    fn today(&self) -> DayStamp {
        self.0
    }
}

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Repository operation errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Required fields were missing or empty; reported, never retried.
    #[error("validation failed: {0}")]
    Validation(String),
    /// No record carries the requested identifier; may indicate benign
    /// concurrent deletion.
    #[error("record {0} not found")]
    NotFound(RecordId),
    /// The durable store failed or timed out; safe for the caller to retry
    /// with backoff.
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    /// Credential retrieval failed; fatal to the current operation.
    #[error("authorization failed: {0}")]
    Auth(String),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) | StoreError::Invalid(message) => {
                Self::Upstream(message)
            }
            StoreError::Auth(message) => Self::Auth(message),
        }
    }
}

impl From<AuthError> for RepositoryError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err.0)
    }
}

/// Draft queue operation errors.
#[derive(Debug, Error)]
pub enum DraftQueueError {
    /// The token does not name a queued draft (already saved or discarded).
    #[error("draft {0} not found in queue")]
    NotFound(DraftToken),
    /// Persisting a saved draft failed; the draft remains queued.
    #[error("draft persistence failed: {0}")]
    Persist(#[source] RepositoryError),
    /// Queue state was unrecoverable (poisoned lock).
    #[error("draft queue internal error: {0}")]
    Internal(String),
}
