//! Reminder board: every open task classified against one instant.
//!
//! Phases are computed on demand; nothing here re-runs on a timer, so a
//! board is only as fresh as the `now` it was built with.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::quality::QualityTask;
use crate::reminder::{task_reminder, TaskReminder};
use crate::repository::{ScheduleRepository, TaskRepository};
use crate::window::{ReminderPhase, ALMOST_LATE_MINUTES};

/// How the almost-late lead is chosen per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub almost_late_minutes: u32,
    /// Prefer a linked schedule's non-zero `grace_period_after_minutes`.
    pub use_schedule_grace: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            almost_late_minutes: ALMOST_LATE_MINUTES,
            use_schedule_grace: false,
        }
    }
}

/// Number of reminders per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounts {
    pub upcoming: usize,
    pub can_start: usize,
    pub due_now: usize,
    pub almost_late: usize,
    pub overdue: usize,
}

impl PhaseCounts {
    pub fn get(&self, phase: ReminderPhase) -> usize {
        match phase {
            ReminderPhase::Upcoming => self.upcoming,
            ReminderPhase::CanStart => self.can_start,
            ReminderPhase::DueNow => self.due_now,
            ReminderPhase::AlmostLate => self.almost_late,
            ReminderPhase::Overdue => self.overdue,
        }
    }

    /// Reminders that need someone's attention now.
    pub fn needs_attention(&self) -> usize {
        self.due_now + self.almost_late + self.overdue
    }
}

pub fn phase_counts(reminders: &[TaskReminder]) -> PhaseCounts {
    let mut counts = PhaseCounts::default();
    for reminder in reminders {
        let slot = match reminder.phase {
            ReminderPhase::Upcoming => &mut counts.upcoming,
            ReminderPhase::CanStart => &mut counts.can_start,
            ReminderPhase::DueNow => &mut counts.due_now,
            ReminderPhase::AlmostLate => &mut counts.almost_late,
            ReminderPhase::Overdue => &mut counts.overdue,
        };
        *slot += 1;
    }
    counts
}

/// Classify every open task in `repo` at `now`.
///
/// Completed and skipped tasks are left out. Tasks whose stored date or
/// times do not parse are logged and left out rather than failing the
/// whole board.
pub fn reminder_board<R>(
    repo: &R,
    now: NaiveDateTime,
    settings: ReminderSettings,
) -> Result<Vec<TaskReminder>>
where
    R: TaskRepository + ScheduleRepository + ?Sized,
{
    let grace: HashMap<String, u32> = if settings.use_schedule_grace {
        repo.list_schedules()?
            .into_iter()
            .filter(|s| s.grace_period_after_minutes > 0)
            .map(|s| (s.id, s.grace_period_after_minutes))
            .collect()
    } else {
        HashMap::new()
    };

    let mut reminders = Vec::new();
    for task in repo.list_tasks()? {
        if !task.status.is_open() {
            continue;
        }
        let lead = lead_for(&task, &grace, settings);
        match task_reminder(&task, now, lead) {
            Ok(reminder) => reminders.push(reminder),
            Err(err) => {
                tracing::warn!(task_id = %task.id, %err, "skipping task with unreadable window");
            }
        }
    }

    tracing::debug!(count = reminders.len(), "built reminder board");
    Ok(reminders)
}

fn lead_for(task: &QualityTask, grace: &HashMap<String, u32>, settings: ReminderSettings) -> u32 {
    task.schedule_id
        .as_ref()
        .and_then(|id| grace.get(id))
        .copied()
        .unwrap_or(settings.almost_late_minutes)
}
