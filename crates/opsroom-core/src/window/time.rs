use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time of day at minute resolution.
///
/// Stored as minutes since midnight so window breakpoints compare as plain
/// integers. Parsed from and displayed as 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from hour and minute, `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Truncate a `NaiveTime` to its minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    /// Parse `HH:MM` (a trailing `:SS` is accepted and dropped).
    ///
    /// # Errors
    /// Returns `InvalidTimeFormat` naming `field` when the text is not a
    /// valid 24-hour clock time.
    pub fn parse_field(field: &str, value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTimeFormat {
            field: field.to_string(),
            value: value.to_string(),
        };

        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self::from_time)
            .map_err(|_| invalid())
    }

    /// Normalize a clock field to `HH:MM`, leaving unparseable text as is.
    pub fn canonical(value: &str) -> String {
        Self::parse(value)
            .map(|t| t.to_string())
            .unwrap_or_else(|_| value.to_string())
    }

    /// Parse a time with a generic field name.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::parse_field("time", value)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Move earlier by `minutes`, clamping at midnight.
    pub fn saturating_sub_minutes(self, minutes: u32) -> Self {
        Self(u32::from(self.0).saturating_sub(minutes) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}
