// crates/rowledger-core/src/core/record.rs
// ============================================================================
// Module: Rowledger Record Model
// Description: Persisted records, pre-persistence drafts, and the status machine.
// Purpose: Define the tabular row schema and confirmation-status transitions.
// Dependencies: serde, crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! A [`Record`] is one row of the durable store; a [`Draft`] is an
//! unpersisted candidate with the same content fields. Rows use a fixed
//! column order with a single header row at position zero. Row mapping is
//! tolerant: rows whose identifier or status cells do not parse are skipped
//! rather than failing the whole read, so legacy garbage in the store never
//! takes the proxy down.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RecordId;
use crate::core::time::DayStamp;

// ============================================================================
// SECTION: Column Schema
// ============================================================================

/// Column positions within a store row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridColumn {
    /// Record identifier.
    Id,
    /// Short topic text.
    Topics,
    /// Comma-delimited tags.
    Tags,
    /// Free-text key facts.
    KeyFacts,
    /// Day-granularity last-updated date.
    LastUpdated,
    /// Confirmation status label.
    Status,
}

impl GridColumn {
    /// Returns the zero-based column index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Id => 0,
            Self::Topics => 1,
            Self::Tags => 2,
            Self::KeyFacts => 3,
            Self::LastUpdated => 4,
            Self::Status => 5,
        }
    }
}

/// Number of columns in a store row.
pub const COLUMN_COUNT: usize = 6;

/// Position offset of the first record row (row zero is the header).
pub const HEADER_ROWS: usize = 1;

/// Canonical header row labels, in column order.
pub const HEADER_LABELS: [&str; COLUMN_COUNT] =
    ["ID", "Topics", "Tags", "Key Facts", "Last Updated", "Confirmation Status"];

/// Builds the canonical header row.
#[must_use]
pub fn header_row() -> Vec<String> {
    HEADER_LABELS.iter().map(|label| (*label).to_string()).collect()
}

// ============================================================================
// SECTION: Confirmation Status
// ============================================================================

/// Confirmation status of a persisted record.
///
/// # Invariants
/// - `Pending` is the only initial state unless the caller overrides it.
/// - `Confirmed` and `AutoDeleted` are terminal; no lifecycle path leaves
///   them. Manual status updates may still set any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationStatus {
    /// Awaiting human confirmation; subject to TTL eviction.
    Pending,
    /// Confirmed by a caller or draft promotion.
    Confirmed,
    /// Marked expired by the staleness sweeper.
    AutoDeleted,
}

impl ConfirmationStatus {
    /// Returns the stable wire label for the status.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::AutoDeleted => "auto-deleted",
        }
    }

    /// Parses a status cell; empty cells read as `Pending`.
    ///
    /// Returns `None` for labels that are not part of the status machine.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "" | "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "auto-deleted" => Some(Self::AutoDeleted),
            _ => None,
        }
    }

    /// Returns `true` when the record still awaits confirmation.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` for states with no outgoing lifecycle transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::AutoDeleted)
    }
}

impl fmt::Display for ConfirmationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

// ============================================================================
// SECTION: Record
// ============================================================================

/// A persisted unit of the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record identifier.
    pub id: RecordId,
    /// Short topic text.
    pub topics: String,
    /// Comma-delimited tags.
    pub tags: String,
    /// Free-text key facts.
    pub key_facts: String,
    /// Date of the last content mutation.
    pub last_updated: DayStamp,
    /// Confirmation status.
    pub status: ConfirmationStatus,
}

impl Record {
    /// Maps a store row to a record.
    ///
    /// Returns `None` when the identifier, date, or status cell cannot be
    /// parsed; such rows are tolerated in the store but invisible to the
    /// lifecycle engine.
    #[must_use]
    pub fn from_row(row: &[String]) -> Option<Self> {
        let cell = |column: GridColumn| row.get(column.index()).map_or("", String::as_str);
        let id: u64 = cell(GridColumn::Id).trim().parse().ok()?;
        if id == 0 {
            return None;
        }
        let last_updated: DayStamp = cell(GridColumn::LastUpdated).parse().ok()?;
        let status = ConfirmationStatus::from_label(cell(GridColumn::Status))?;
        Some(Self {
            id: RecordId::new(id),
            topics: cell(GridColumn::Topics).to_string(),
            tags: cell(GridColumn::Tags).to_string(),
            key_facts: cell(GridColumn::KeyFacts).to_string(),
            last_updated,
            status,
        })
    }

    /// Serializes the record into a store row in column order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.topics.clone(),
            self.tags.clone(),
            self.key_facts.clone(),
            self.last_updated.to_string(),
            self.status.as_label().to_string(),
        ]
    }
}

// ============================================================================
// SECTION: Creation Input
// ============================================================================

/// Caller-supplied fields for a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Short topic text; required.
    pub topics: String,
    /// Comma-delimited tags; required.
    pub tags: String,
    /// Free-text key facts; required.
    pub key_facts: String,
    /// Optional status override; defaults to `Pending`.
    pub status: Option<ConfirmationStatus>,
}

// ============================================================================
// SECTION: Draft
// ============================================================================

/// An unpersisted candidate record awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Short topic text.
    pub topics: String,
    /// Comma-delimited tags.
    pub tags: String,
    /// Free-text key facts.
    pub key_facts: String,
}

impl Draft {
    /// Converts the draft into creation input with an explicit status.
    #[must_use]
    pub fn to_new_record(&self, status: ConfirmationStatus) -> NewRecord {
        NewRecord {
            topics: self.topics.clone(),
            tags: self.tags.clone(),
            key_facts: self.key_facts.clone(),
            status: Some(status),
        }
    }
}
