// crates/rowledger-core/src/runtime/repository.rs
// ============================================================================
// Module: Rowledger Record Repository
// Description: CRUD and filtered queries over the durable tabular store.
// Purpose: Own id assignment and confirmation-status persistence.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The repository maps store rows to [`Record`]s using the fixed column
//! schema and applies the lifecycle rules: monotonic id assignment, status
//! defaults, and hard deletion. Identifier assignment scans raw id cells,
//! so a row that does not fully map still reserves its id. The store
//! offers no indexed lookup, so every
//! mutating call re-scans the live snapshot to resolve the target row's
//! position at call time; positions are never cached across calls because a
//! concurrent deletion shifts every later row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::filter::RecordFilter;
use crate::core::identifiers::RecordId;
use crate::core::record::ConfirmationStatus;
use crate::core::record::GridColumn;
use crate::core::record::HEADER_ROWS;
use crate::core::record::NewRecord;
use crate::core::record::Record;
use crate::core::time::DayStamp;
use crate::interfaces::Clock;
use crate::interfaces::RepositoryError;
use crate::interfaces::StoreAdapter;

// ============================================================================
// SECTION: Repository
// ============================================================================

/// CRUD and filtering over records fetched through a [`StoreAdapter`].
pub struct RecordRepository<S> {
    /// Durable store adapter.
    store: S,
    /// Source of the current calendar day.
    clock: Arc<dyn Clock>,
}

impl<S: StoreAdapter> RecordRepository<S> {
    /// Creates a repository over the given store and clock.
    #[must_use]
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
        }
    }

    /// Returns the current day from the injected clock.
    #[must_use]
    pub fn today(&self) -> DayStamp {
        self.clock.today()
    }

    /// Lists every record matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Upstream`] when the store read fails;
    /// partial results are never returned.
    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>, RepositoryError> {
        let rows = self.store.read_all()?;
        Ok(mapped_records(&rows)
            .into_iter()
            .map(|(_, record)| record)
            .filter(|record| filter.matches(record))
            .collect())
    }

    /// Creates a record with the next free identifier and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Validation`] when a required field is
    /// empty and [`RepositoryError::Upstream`] when the store fails.
    pub fn create(&self, new: NewRecord) -> Result<Record, RepositoryError> {
        validate_fields(&new)?;
        let rows = self.store.read_all()?;
        let max_id = max_assigned_id(&rows);
        let record = Record {
            id: RecordId::new(max_id + 1),
            topics: new.topics,
            tags: new.tags,
            key_facts: new.key_facts,
            last_updated: self.clock.today(),
            status: new.status.unwrap_or(ConfirmationStatus::Pending),
        };
        self.store.append(&record.to_row())?;
        Ok(record)
    }

    /// Overwrites the status cell of the record with the given identifier.
    ///
    /// Only the status cell changes; in particular `last_updated` is left
    /// untouched on this path, so a stale pending record manually reverted
    /// to `pending` keeps its original staleness.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when no live row carries the
    /// identifier (benign under concurrent deletion) and
    /// [`RepositoryError::Upstream`] when the store fails.
    pub fn update_status(
        &self,
        id: RecordId,
        status: ConfirmationStatus,
    ) -> Result<Record, RepositoryError> {
        let (position, mut record) = self.locate(id)?;
        self.store.update_cell(position, GridColumn::Status.index(), status.as_label())?;
        record.status = status;
        Ok(record)
    }

    /// Hard-deletes the record with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when no live row carries the
    /// identifier and [`RepositoryError::Upstream`] when the store fails.
    pub fn delete(&self, id: RecordId) -> Result<(), RepositoryError> {
        let (position, _) = self.locate(id)?;
        self.store.delete_rows(position, position + 1)?;
        Ok(())
    }

    /// Resolves the live position of the record with the given identifier.
    ///
    /// The scan runs against a fresh snapshot on every call; the store is
    /// the source of truth and may have shifted since any prior read.
    fn locate(&self, id: RecordId) -> Result<(usize, Record), RepositoryError> {
        let rows = self.store.read_all()?;
        mapped_records(&rows)
            .into_iter()
            .find(|(_, record)| record.id == id)
            .ok_or(RepositoryError::NotFound(id))
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Maps store rows to records paired with their live row positions.
///
/// The header row and rows that do not parse as records are skipped.
fn mapped_records(rows: &[Vec<String>]) -> Vec<(usize, Record)> {
    rows.iter()
        .enumerate()
        .skip(HEADER_ROWS)
        .filter_map(|(position, row)| Record::from_row(row).map(|record| (position, record)))
        .collect()
}

/// Returns the highest identifier found in any row's id cell.
///
/// Scans raw rows rather than mapped records: a legacy row whose date or
/// status cell is garbage still reserves its identifier, so new records
/// never collide with it.
fn max_assigned_id(rows: &[Vec<String>]) -> u64 {
    rows.iter()
        .skip(HEADER_ROWS)
        .filter_map(|row| row.get(GridColumn::Id.index()))
        .filter_map(|cell| cell.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

/// Rejects creation input with missing required fields.
fn validate_fields(new: &NewRecord) -> Result<(), RepositoryError> {
    let mut missing = Vec::new();
    if new.topics.trim().is_empty() {
        missing.push("topics");
    }
    if new.tags.trim().is_empty() {
        missing.push("tags");
    }
    if new.key_facts.trim().is_empty() {
        missing.push("key_facts");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RepositoryError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}
