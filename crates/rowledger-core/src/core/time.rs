// crates/rowledger-core/src/core/time.rs
// ============================================================================
// Module: Rowledger Time Model
// Description: Day-granularity timestamps for record staleness decisions.
// Purpose: Provide a stable, comparable date value with an ISO string form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Record freshness is tracked at day granularity: `last_updated` is a date,
//! and the staleness sweeper compares whole-day differences against the TTL.
//! The engine never reads wall-clock time directly; hosts supply "today"
//! through the [`Clock`](crate::interfaces::Clock) seam so time-driven
//! behavior stays deterministic in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use thiserror::Error;
use time::Date;
use time::Duration;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Canonical `YYYY-MM-DD` format used in the store's date cells.
const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: Day Stamp
// ============================================================================

/// Error returned when a date cell cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid day stamp {value:?}: expected YYYY-MM-DD")]
pub struct DayStampError {
    /// Offending input value.
    pub value: String,
}

/// A day-granularity date with a canonical `YYYY-MM-DD` string form.
///
/// # Invariants
/// - Ordering follows calendar order; equality means the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayStamp(Date);

impl DayStamp {
    /// Wraps an explicit calendar date.
    #[must_use]
    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    /// Returns the underlying calendar date.
    #[must_use]
    pub const fn date(self) -> Date {
        self.0
    }

    /// Returns the number of whole days from `self` to `other`.
    ///
    /// Positive when `other` is later than `self`.
    #[must_use]
    pub const fn days_until(self, other: Self) -> i64 {
        (other.0.to_julian_day() - self.0.to_julian_day()) as i64
    }

    /// Returns the stamp shifted `days` into the past, saturating at the
    /// calendar boundary.
    #[must_use]
    pub fn minus_days(self, days: u16) -> Self {
        self.0.checked_sub(Duration::days(i64::from(days))).map_or(self, Self)
    }
}

impl fmt::Display for DayStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(DAY_FORMAT) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for DayStamp {
    type Err = DayStampError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Date::parse(value.trim(), DAY_FORMAT).map(Self).map_err(|_| DayStampError {
            value: value.to_string(),
        })
    }
}

impl Serialize for DayStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DayStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}
