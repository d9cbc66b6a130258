// crates/rowledger-core/src/core/mod.rs
// ============================================================================
// Module: Rowledger Core Model
// Description: Data model shared by the lifecycle engine and its adapters.
// Purpose: Group identifiers, records, filters, and time values.
// Dependencies: crate::core submodules
// ============================================================================

//! ## Overview
//! The core model is plain data: identifiers, the record/draft shapes, the
//! filter predicates, and day-granularity time values. Behavior lives in
//! [`crate::runtime`]; collaborator seams live in [`crate::interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod filter;
pub mod identifiers;
pub mod record;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use filter::RecordFilter;
pub use identifiers::DraftToken;
pub use identifiers::RecordId;
pub use record::COLUMN_COUNT;
pub use record::ConfirmationStatus;
pub use record::Draft;
pub use record::GridColumn;
pub use record::HEADER_LABELS;
pub use record::HEADER_ROWS;
pub use record::NewRecord;
pub use record::Record;
pub use record::header_row;
pub use time::DayStamp;
pub use time::DayStampError;
