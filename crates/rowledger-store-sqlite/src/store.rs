// crates/rowledger-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Grid Store
// Description: Durable StoreAdapter backed by SQLite.
// Purpose: Persist positional rows with contiguous reindexing on delete.
// Dependencies: rowledger-core, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Rows live in one table keyed by position, with each row serialized as a
//! JSON array of cell strings. Position zero is the header row, seeded on
//! first open. Every mutation runs inside a transaction; deletions shift
//! later rows down through a two-step reindex so the unique position
//! constraint never trips mid-update. Database contents are untrusted:
//! rows that do not deserialize fail the read rather than being guessed at.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rowledger_core::StoreAdapter;
use rowledger_core::StoreError;
use rowledger_core::header_row;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current schema version recorded in `store_meta`.
const SCHEMA_VERSION: i64 = 1;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the `SQLite` grid store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteStoreConfig {
    /// Filesystem path of the database.
    pub path: PathBuf,
    /// Busy timeout applied to the connection, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Creates a configuration for the given database path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: 5_000,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` grid store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Database-level failure.
    #[error("sqlite failure: {0}")]
    Db(String),
    /// Stored data failed validation on read.
    #[error("sqlite store corrupt: {0}")]
    Corrupt(String),
    /// The request was malformed for the live grid state.
    #[error("invalid sqlite store request: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Db(message) => Self::Unavailable(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
        }
    }
}

/// Maps a `rusqlite` error onto the store error taxonomy.
fn db_err(err: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Durable store adapter over a positional `SQLite` row grid.
///
/// # Invariants
/// - Positions are contiguous from zero after every committed mutation.
/// - Position zero holds the header row and is seeded on first open.
/// - All access is serialized through one connection.
pub struct SqliteStoreAdapter {
    /// Serialized database connection.
    connection: Mutex<Connection>,
}

impl SqliteStoreAdapter {
    /// Opens the database, initializing schema and header on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// the schema cannot be initialized.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Locks the connection, surfacing poisoning as a database error.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))
    }
}

impl StoreAdapter for SqliteStoreAdapter {
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare("SELECT row_json FROM grid_rows ORDER BY position")
            .map_err(|err| db_err(&err))?;
        let encoded = statement
            .query_map(params![], |row| row.get::<_, String>(0))
            .map_err(|err| db_err(&err))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|err| db_err(&err))?;
        let mut rows = Vec::with_capacity(encoded.len());
        for cell_json in encoded {
            let cells: Vec<String> = serde_json::from_str(&cell_json).map_err(|_| {
                SqliteStoreError::Corrupt("stored row is not a cell array".to_string())
            })?;
            rows.push(cells);
        }
        Ok(rows)
    }

    fn append(&self, row: &[String]) -> Result<(), StoreError> {
        let cell_json = encode_row(row)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        tx.execute(
            "INSERT INTO grid_rows (position, row_json)
             SELECT COALESCE(MAX(position) + 1, 0), ?1 FROM grid_rows",
            params![cell_json],
        )
        .map_err(|err| db_err(&err))?;
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(())
    }

    fn update_cell(&self, row_index: usize, column: usize, value: &str) -> Result<(), StoreError> {
        let position = to_position(row_index)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let cell_json: Option<String> = tx
            .query_row(
                "SELECT row_json FROM grid_rows WHERE position = ?1",
                params![position],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| db_err(&err))?;
        let cell_json = cell_json.ok_or_else(|| {
            StoreError::from(SqliteStoreError::Invalid(format!(
                "row index {row_index} out of range"
            )))
        })?;
        let mut cells: Vec<String> = serde_json::from_str(&cell_json).map_err(|_| {
            SqliteStoreError::Corrupt("stored row is not a cell array".to_string())
        })?;
        if cells.len() <= column {
            cells.resize(column + 1, String::new());
        }
        cells[column] = value.to_string();
        let updated = encode_row(&cells)?;
        tx.execute(
            "UPDATE grid_rows SET row_json = ?1 WHERE position = ?2",
            params![updated, position],
        )
        .map_err(|err| db_err(&err))?;
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(())
    }

    fn delete_rows(&self, start: usize, end: usize) -> Result<(), StoreError> {
        let (start_position, end_position) = to_range(start, end)?;
        let shift = end_position - start_position;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        validate_range(&tx, start, end)?;
        tx.execute(
            "DELETE FROM grid_rows WHERE position >= ?1 AND position < ?2",
            params![start_position, end_position],
        )
        .map_err(|err| db_err(&err))?;
        // Two-step reindex: negate the shifting positions first so the
        // unique constraint never sees a collision mid-update.
        tx.execute(
            "UPDATE grid_rows SET position = -position WHERE position >= ?1",
            params![end_position],
        )
        .map_err(|err| db_err(&err))?;
        tx.execute(
            "UPDATE grid_rows SET position = -position - ?1 WHERE position < 0",
            params![shift],
        )
        .map_err(|err| db_err(&err))?;
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(())
    }

    fn clear_rows(&self, start: usize, end: usize) -> Result<(), StoreError> {
        let (start_position, end_position) = to_range(start, end)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        validate_range(&tx, start, end)?;
        let targets = {
            let mut statement = tx
                .prepare(
                    "SELECT position, row_json FROM grid_rows
                     WHERE position >= ?1 AND position < ?2",
                )
                .map_err(|err| db_err(&err))?;
            statement
                .query_map(params![start_position, end_position], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(|err| db_err(&err))?
                .collect::<Result<Vec<(i64, String)>, _>>()
                .map_err(|err| db_err(&err))?
        };
        for (position, cell_json) in targets {
            let cells: Vec<String> = serde_json::from_str(&cell_json).map_err(|_| {
                SqliteStoreError::Corrupt("stored row is not a cell array".to_string())
            })?;
            let blanked = encode_row(&vec![String::new(); cells.len()])?;
            tx.execute(
                "UPDATE grid_rows SET row_json = ?1 WHERE position = ?2",
                params![blanked, position],
            )
            .map_err(|err| db_err(&err))?;
        }
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Opens an `SQLite` connection with serialized-access flags.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_err(&err))?;
    connection.execute_batch("PRAGMA journal_mode = WAL;").map_err(|err| db_err(&err))?;
    connection.execute_batch("PRAGMA synchronous = FULL;").map_err(|err| db_err(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_err(&err))?;
    Ok(connection)
}

/// Initializes the schema and seeds the header row on an empty grid.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| db_err(&err))?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);
         CREATE TABLE IF NOT EXISTS grid_rows (
             position INTEGER NOT NULL UNIQUE,
             row_json TEXT NOT NULL
         );",
    )
    .map_err(|err| db_err(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_err(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_err(&err))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(found) => {
            return Err(SqliteStoreError::Corrupt(format!(
                "unsupported schema version {found}"
            )));
        }
    }
    let row_count: i64 = tx
        .query_row("SELECT COUNT(*) FROM grid_rows", params![], |row| row.get(0))
        .map_err(|err| db_err(&err))?;
    if row_count == 0 {
        let header = serde_json::to_string(&header_row()).map_err(|err| {
            SqliteStoreError::Db(format!("header serialization failed: {err}"))
        })?;
        tx.execute("INSERT INTO grid_rows (position, row_json) VALUES (0, ?1)", params![header])
            .map_err(|err| db_err(&err))?;
    }
    tx.commit().map_err(|err| db_err(&err))?;
    Ok(())
}

/// Serializes one row as a JSON cell array.
fn encode_row(row: &[String]) -> Result<String, SqliteStoreError> {
    serde_json::to_string(row)
        .map_err(|err| SqliteStoreError::Db(format!("row serialization failed: {err}")))
}

/// Converts a row index into a database position value.
fn to_position(row_index: usize) -> Result<i64, SqliteStoreError> {
    i64::try_from(row_index)
        .map_err(|_| SqliteStoreError::Invalid(format!("row index {row_index} out of range")))
}

/// Converts a half-open row range into database position values.
fn to_range(start: usize, end: usize) -> Result<(i64, i64), SqliteStoreError> {
    if start > end {
        return Err(SqliteStoreError::Invalid(format!("row range {start}..{end} is inverted")));
    }
    Ok((to_position(start)?, to_position(end)?))
}

/// Rejects ranges extending past the live row count.
fn validate_range(tx: &Transaction<'_>, start: usize, end: usize) -> Result<(), StoreError> {
    let row_count: i64 = tx
        .query_row("SELECT COUNT(*) FROM grid_rows", params![], |row| row.get(0))
        .map_err(|err| db_err(&err))?;
    let row_count = usize::try_from(row_count)
        .map_err(|_| SqliteStoreError::Corrupt("negative row count".to_string()))?;
    if end > row_count {
        return Err(SqliteStoreError::Invalid(format!(
            "row range {start}..{end} out of range for {row_count} rows"
        ))
        .into());
    }
    Ok(())
}
