//! Temporal helpers for claim aging and timeline display
//!
//! Aging is measured in whole days between two instants; timelines are
//! grouped by calendar date in the dashboard's display timezone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use std::str::FromStr;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Display timezone wrapper
///
/// Wraps chrono_tz::Tz with custom serialization support. Claims are stored
/// in UTC; the timezone only matters when the timeline is bucketed into
/// calendar dates for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(name.to_string()))
    }

    /// Converts a UTC instant to a calendar date in this timezone
    pub fn calendar_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Whole days elapsed from `since` to `now`, clamped at zero
///
/// Clock skew can put `since` in the future; an outstanding claim is never
/// negative days old.
pub fn whole_days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = (now - since).num_days();
    days.max(0) as u32
}
