//! Quality task scheduling records.
//!
//! A [`QualitySchedule`] describes a recurring inspection or check; each
//! [`QualityTask`] is one dated instance with its own time window. Schedules
//! keep their recurrence fields for display and filtering, but instances are
//! created explicitly rather than expanded from those fields.

mod schedule;
mod task;

pub use schedule::{Frequency, QualitySchedule};
pub use task::{QualityTask, TaskStatus, TaskTransitionError};
