// crates/rowledger-core/src/runtime/store.rs
// ============================================================================
// Module: Rowledger In-Memory Store
// Description: Simple in-memory store adapter for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`StoreAdapter`] for tests and local demos, plus a shared wrapper for
//! composing the engine over a boxed adapter. The in-memory grid supports
//! failure injection so upstream-outage paths can be exercised
//! deterministically. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::core::record::header_row;
use crate::interfaces::StoreAdapter;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory store adapter for tests and examples.
#[derive(Clone)]
pub struct InMemoryStoreAdapter {
    /// Row grid protected by a mutex; row zero is the header.
    rows: Arc<Mutex<Vec<Vec<String>>>>,
    /// Failure injection switch for upstream-outage tests.
    unavailable: Arc<AtomicBool>,
}

impl Default for InMemoryStoreAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStoreAdapter {
    /// Creates a store seeded with the canonical header row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(vec![header_row()])),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a store from explicit rows, header included.
    #[must_use]
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Toggles injected store outage for every subsequent call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of live rows, header included.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the grid mutex is poisoned.
    pub fn row_count(&self) -> Result<usize, StoreError> {
        Ok(self.grid()?.len())
    }

    /// Fails when outage injection is active.
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected store outage".to_string()));
        }
        Ok(())
    }

    /// Locks the grid, surfacing poisoning as a store error.
    fn grid(&self) -> Result<MutexGuard<'_, Vec<Vec<String>>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory grid mutex poisoned".to_string()))
    }
}

impl StoreAdapter for InMemoryStoreAdapter {
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.check_available()?;
        Ok(self.grid()?.clone())
    }

    fn append(&self, row: &[String]) -> Result<(), StoreError> {
        self.check_available()?;
        self.grid()?.push(row.to_vec());
        Ok(())
    }

    fn update_cell(&self, row_index: usize, column: usize, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut grid = self.grid()?;
        let row = grid.get_mut(row_index).ok_or_else(|| {
            StoreError::Invalid(format!("row index {row_index} out of range"))
        })?;
        if row.len() <= column {
            row.resize(column + 1, String::new());
        }
        row[column] = value.to_string();
        Ok(())
    }

    fn delete_rows(&self, start: usize, end: usize) -> Result<(), StoreError> {
        self.check_available()?;
        let mut grid = self.grid()?;
        if start > end || end > grid.len() {
            return Err(StoreError::Invalid(format!(
                "row range {start}..{end} out of range for {} rows",
                grid.len()
            )));
        }
        grid.drain(start .. end);
        Ok(())
    }

    fn clear_rows(&self, start: usize, end: usize) -> Result<(), StoreError> {
        self.check_available()?;
        let mut grid = self.grid()?;
        if start > end || end > grid.len() {
            return Err(StoreError::Invalid(format!(
                "row range {start}..{end} out of range for {} rows",
                grid.len()
            )));
        }
        for row in &mut grid[start .. end] {
            for cell in row.iter_mut() {
                cell.clear();
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared store adapter backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedStoreAdapter {
    /// Inner adapter implementation.
    inner: Arc<dyn StoreAdapter>,
}

impl SharedStoreAdapter {
    /// Wraps a store adapter in a shared, clonable wrapper.
    #[must_use]
    pub fn from_adapter(adapter: impl StoreAdapter + 'static) -> Self {
        Self {
            inner: Arc::new(adapter),
        }
    }

    /// Wraps an existing shared adapter.
    #[must_use]
    pub const fn new(adapter: Arc<dyn StoreAdapter>) -> Self {
        Self {
            inner: adapter,
        }
    }
}

impl StoreAdapter for SharedStoreAdapter {
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.inner.read_all()
    }

    fn append(&self, row: &[String]) -> Result<(), StoreError> {
        self.inner.append(row)
    }

    fn update_cell(&self, row_index: usize, column: usize, value: &str) -> Result<(), StoreError> {
        self.inner.update_cell(row_index, column, value)
    }

    fn delete_rows(&self, start: usize, end: usize) -> Result<(), StoreError> {
        self.inner.delete_rows(start, end)
    }

    fn clear_rows(&self, start: usize, end: usize) -> Result<(), StoreError> {
        self.inner.clear_rows(start, end)
    }
}
