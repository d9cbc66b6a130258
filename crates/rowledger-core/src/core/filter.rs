// crates/rowledger-core/src/core/filter.rs
// ============================================================================
// Module: Rowledger Record Filter
// Description: AND-combined optional predicates over persisted records.
// Purpose: Provide the query semantics behind list operations.
// Dependencies: serde, crate::core::{record, time}
// ============================================================================

//! ## Overview
//! A filter is a set of optional predicates combined with AND. Text matches
//! are case-insensitive; the free-text predicate scans the concatenation of
//! every field value, including the identifier, date, and status label.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::record::Record;
use crate::core::time::DayStamp;

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Optional record predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive exact match against `topics`.
    pub topic: Option<String>,
    /// Case-insensitive substring match against `tags`.
    pub tag: Option<String>,
    /// Inclusive lower bound on `last_updated`.
    pub since: Option<DayStamp>,
    /// Case-insensitive substring match over all field values.
    pub q: Option<String>,
}

impl RecordFilter {
    /// Returns an empty filter that matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns `true` when the record satisfies every present predicate.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(topic) = &self.topic
            && !record.topics.eq_ignore_ascii_case(topic)
        {
            return false;
        }
        if let Some(tag) = &self.tag
            && !record.tags.to_lowercase().contains(&tag.to_lowercase())
        {
            return false;
        }
        if let Some(since) = self.since
            && record.last_updated < since
        {
            return false;
        }
        if let Some(query) = &self.q {
            let needle = query.to_lowercase();
            let haystack = [
                record.id.to_string(),
                record.topics.clone(),
                record.tags.clone(),
                record.key_facts.clone(),
                record.last_updated.to_string(),
                record.status.as_label().to_string(),
            ];
            if !haystack.iter().any(|value| value.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }
}
