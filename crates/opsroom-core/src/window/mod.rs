//! Reminder phase classification for a scheduled task's time window.
//!
//! A task instance carries a scheduled date and three clock times. Given
//! "now", [`classify`] reports where now falls relative to those markers:
//!
//! ```text
//!   upcoming | can_start | due_now | almost_late | overdue
//!          start       due    end - 5min       end
//! ```
//!
//! A task scheduled for any other calendar day is always `Upcoming`, even
//! when its date is in the past. Stale instances are expected to be hidden
//! or regenerated elsewhere, so they are never promoted to `Overdue` here.

mod time;

pub use time::{parse_date, TimeOfDay, MINUTES_PER_DAY};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::ValidationError;

/// Minutes before `window_end` at which a task becomes almost late.
pub const ALMOST_LATE_MINUTES: u32 = 5;

/// Where "now" falls relative to a task's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderPhase {
    /// Not today, or before the window opens.
    Upcoming,
    /// Window is open, not yet due.
    CanStart,
    /// Past the due time.
    DueNow,
    /// Within the last minutes before the window closes.
    AlmostLate,
    /// Window has closed.
    Overdue,
}

impl ReminderPhase {
    pub const ALL: [ReminderPhase; 5] = [
        ReminderPhase::Upcoming,
        ReminderPhase::CanStart,
        ReminderPhase::DueNow,
        ReminderPhase::AlmostLate,
        ReminderPhase::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderPhase::Upcoming => "upcoming",
            ReminderPhase::CanStart => "can_start",
            ReminderPhase::DueNow => "due_now",
            ReminderPhase::AlmostLate => "almost_late",
            ReminderPhase::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for ReminderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// The four time markers of one scheduled task instance.
///
/// Rebuilt from the stored record on every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTimeWindow {
    pub scheduled_date: NaiveDate,
    pub window_start: TimeOfDay,
    pub due_time: TimeOfDay,
    pub window_end: TimeOfDay,
}

impl TaskTimeWindow {
    pub fn new(
        scheduled_date: NaiveDate,
        window_start: TimeOfDay,
        due_time: TimeOfDay,
        window_end: TimeOfDay,
    ) -> Self {
        Self {
            scheduled_date,
            window_start,
            due_time,
            window_end,
        }
    }

    /// Build a window from the text fields of a task record.
    ///
    /// # Errors
    /// Returns `InvalidDate` or `InvalidTimeFormat` for the first field
    /// that does not parse.
    pub fn from_strings(
        scheduled_date: &str,
        window_start: &str,
        due_time: &str,
        window_end: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            scheduled_date: parse_date(scheduled_date)?,
            window_start: TimeOfDay::parse_field("window_start", window_start)?,
            due_time: TimeOfDay::parse_field("due_time", due_time)?,
            window_end: TimeOfDay::parse_field("window_end", window_end)?,
        })
    }

    /// `window_end` minus the default five-minute lead.
    pub fn almost_late_threshold(&self) -> TimeOfDay {
        self.almost_late_threshold_with(ALMOST_LATE_MINUTES)
    }

    pub fn almost_late_threshold_with(&self, lead_minutes: u32) -> TimeOfDay {
        self.window_end.saturating_sub_minutes(lead_minutes)
    }

    /// Check `start <= due <= end - 5min <= end`.
    ///
    /// Classification never calls this; out-of-order windows are classified
    /// by the ordered comparisons alone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(ALMOST_LATE_MINUTES)
    }

    pub fn validate_with(&self, lead_minutes: u32) -> Result<(), ValidationError> {
        let almost_late = self.almost_late_threshold_with(lead_minutes);
        let ordered = self.window_start <= self.due_time
            && self.due_time <= almost_late
            && almost_late <= self.window_end
            && u32::from(self.window_end.minutes()) >= lead_minutes;
        if ordered {
            Ok(())
        } else {
            Err(ValidationError::InconsistentWindow {
                window_start: self.window_start.to_string(),
                due_time: self.due_time.to_string(),
                almost_late: almost_late.to_string(),
                window_end: self.window_end.to_string(),
            })
        }
    }
}

/// Classify `now` against `window` with the fixed five-minute lead.
pub fn classify(now: NaiveDateTime, window: &TaskTimeWindow) -> ReminderPhase {
    classify_with_lead(now, window, ALMOST_LATE_MINUTES)
}

/// Classify `now` against `window`, entering `AlmostLate` `lead_minutes`
/// before the window closes.
///
/// Every breakpoint is inclusive on its lower side; `window_end` itself is
/// still `AlmostLate`.
pub fn classify_with_lead(
    now: NaiveDateTime,
    window: &TaskTimeWindow,
    lead_minutes: u32,
) -> ReminderPhase {
    if now.date() != window.scheduled_date {
        return ReminderPhase::Upcoming;
    }

    let current = TimeOfDay::from_time(now.time());
    let almost_late = window.almost_late_threshold_with(lead_minutes);

    let phase = if current < window.window_start {
        ReminderPhase::Upcoming
    } else if current < window.due_time {
        ReminderPhase::CanStart
    } else if current < almost_late {
        ReminderPhase::DueNow
    } else if current <= window.window_end {
        ReminderPhase::AlmostLate
    } else {
        ReminderPhase::Overdue
    };

    tracing::debug!(
        now = %current,
        start = %window.window_start,
        due = %window.due_time,
        end = %window.window_end,
        %phase,
        "classified task window"
    );
    phase
}

/// Classify against the clock's current reading.
pub fn classify_now(clock: &dyn Clock, window: &TaskTimeWindow) -> ReminderPhase {
    classify(clock.now(), window)
}
