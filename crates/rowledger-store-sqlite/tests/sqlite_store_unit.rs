// crates/rowledger-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Grid Store Tests
// Description: Tests for positional semantics, reindexing, and durability.
// ============================================================================
//! ## Overview
//! Validates header seeding on first open, contiguous reindexing after
//! deletions, persistence across reopen, range validation, and end-to-end
//! use underneath the record repository.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use rowledger_core::ConfirmationStatus;
use rowledger_core::DayStamp;
use rowledger_core::FixedClock;
use rowledger_core::HEADER_LABELS;
use rowledger_core::NewRecord;
use rowledger_core::RecordFilter;
use rowledger_core::RecordId;
use rowledger_core::RecordRepository;
use rowledger_core::StoreAdapter;
use rowledger_core::StoreError;
use rowledger_store_sqlite::SqliteStoreAdapter;
use rowledger_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

fn open_store(dir: &TempDir) -> SqliteStoreAdapter {
    let config = SqliteStoreConfig::new(dir.path().join("grid.db"));
    SqliteStoreAdapter::open(&config).unwrap()
}

fn row(id: &str) -> Vec<String> {
    vec![
        id.to_string(),
        format!("topic {id}"),
        "tag".to_string(),
        "facts".to_string(),
        "2026-03-15".to_string(),
        "pending".to_string(),
    ]
}

// ============================================================================
// SECTION: Seeding and Round Trips
// ============================================================================

#[test]
fn open_seeds_the_header_row_once() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], HEADER_LABELS.map(str::to_string).to_vec());
    // Reopening an existing database must not duplicate the header.
    drop(store);
    let store = open_store(&dir);
    assert_eq!(store.read_all().unwrap().len(), 1);
}

#[test]
fn appended_rows_come_back_in_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.append(&row("1")).unwrap();
    store.append(&row("2")).unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "1");
    assert_eq!(rows[2][0], "2");
}

#[test]
fn rows_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir);
        store.append(&row("1")).unwrap();
    }
    let store = open_store(&dir);
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "1");
}

// ============================================================================
// SECTION: Cell Updates
// ============================================================================

#[test]
fn update_cell_overwrites_one_cell() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.append(&row("1")).unwrap();
    store.update_cell(1, 5, "confirmed").unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows[1][5], "confirmed");
    assert_eq!(rows[1][0], "1");
}

#[test]
fn update_cell_extends_short_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.append(&["1".to_string(), "topic".to_string()]).unwrap();
    store.update_cell(1, 5, "pending").unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows[1].len(), 6);
    assert_eq!(rows[1][5], "pending");
    assert_eq!(rows[1][3], "");
}

#[test]
fn update_cell_out_of_range_is_invalid() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    match store.update_cell(5, 0, "x") {
        Err(StoreError::Invalid(_)) => {}
        other => panic!("expected invalid error, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Deletion and Reindexing
// ============================================================================

#[test]
fn delete_rows_keeps_positions_contiguous() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    for id in ["1", "2", "3", "4"] {
        store.append(&row(id)).unwrap();
    }
    store.delete_rows(2, 3).unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][0], "1");
    assert_eq!(rows[2][0], "3");
    assert_eq!(rows[3][0], "4");
    // A later positional write lands on the shifted row, proving the
    // reindex really moved positions and not just the read order.
    store.update_cell(2, 5, "confirmed").unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows[2][0], "3");
    assert_eq!(rows[2][5], "confirmed");
}

#[test]
fn delete_rows_supports_multi_row_ranges() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    for id in ["1", "2", "3", "4"] {
        store.append(&row(id)).unwrap();
    }
    store.delete_rows(1, 3).unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "3");
    assert_eq!(rows[2][0], "4");
}

#[test]
fn delete_rows_past_the_end_is_invalid() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.append(&row("1")).unwrap();
    match store.delete_rows(1, 5) {
        Err(StoreError::Invalid(_)) => {}
        other => panic!("expected invalid error, got {other:?}"),
    }
    // The failed call must not have deleted anything.
    assert_eq!(store.read_all().unwrap().len(), 2);
}

#[test]
fn append_after_delete_reuses_the_freed_tail_position() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.append(&row("1")).unwrap();
    store.append(&row("2")).unwrap();
    store.delete_rows(1, 2).unwrap();
    store.append(&row("3")).unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "2");
    assert_eq!(rows[2][0], "3");
}

// ============================================================================
// SECTION: Clearing
// ============================================================================

#[test]
fn clear_rows_blanks_cells_in_place() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.append(&row("1")).unwrap();
    store.append(&row("2")).unwrap();
    store.clear_rows(1, 2).unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].iter().all(String::is_empty));
    assert_eq!(rows[2][0], "2");
}

// ============================================================================
// SECTION: Repository Integration
// ============================================================================

#[test]
fn repository_lifecycle_runs_over_sqlite() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let today: DayStamp = "2026-03-15".parse().unwrap();
    let repository = RecordRepository::new(store, Arc::new(FixedClock(today)));

    let created = repository
        .create(NewRecord {
            topics: "alpha".to_string(),
            tags: "a".to_string(),
            key_facts: "facts".to_string(),
            status: None,
        })
        .unwrap();
    assert_eq!(created.id, RecordId::new(1));

    let updated =
        repository.update_status(created.id, ConfirmationStatus::Confirmed).unwrap();
    assert_eq!(updated.status, ConfirmationStatus::Confirmed);

    repository.delete(created.id).unwrap();
    assert!(repository.list(&RecordFilter::all()).unwrap().is_empty());
}
