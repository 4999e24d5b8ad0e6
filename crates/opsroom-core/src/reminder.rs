//! Human-readable reminder text for classified tasks.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::quality::QualityTask;
use crate::window::{classify_with_lead, ReminderPhase};

/// Canned reminder line for `phase`.
///
/// `scheduled_time` is the task's due time as shown to the operator.
pub fn reminder_message(title: &str, scheduled_time: &str, phase: ReminderPhase) -> String {
    match phase {
        ReminderPhase::Upcoming => format!("{title} is scheduled for {scheduled_time}"),
        ReminderPhase::CanStart => {
            format!("{title} can be started now (due at {scheduled_time})")
        }
        ReminderPhase::DueNow => format!("{title} is due now ({scheduled_time})"),
        ReminderPhase::AlmostLate => {
            format!("{title} is almost late, it was due at {scheduled_time}")
        }
        ReminderPhase::Overdue => format!("{title} is overdue, it was due at {scheduled_time}"),
    }
}

/// A task's phase together with its reminder line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReminder {
    pub task_id: String,
    pub title: String,
    pub scheduled_date: String,
    pub due_time: String,
    pub phase: ReminderPhase,
    pub message: String,
}

/// Classify a stored task at `now` and render its reminder.
///
/// Out-of-order windows are logged and classified anyway.
///
/// # Errors
/// Fails when the task's date or clock fields do not parse.
pub fn task_reminder(
    task: &QualityTask,
    now: NaiveDateTime,
    lead_minutes: u32,
) -> Result<TaskReminder, ValidationError> {
    let window = task.time_window()?;
    if let Err(err) = window.validate_with(lead_minutes) {
        tracing::warn!(task_id = %task.id, %err, "task window out of order");
    }

    let phase = classify_with_lead(now, &window, lead_minutes);
    let due = window.due_time.to_string();
    Ok(TaskReminder {
        task_id: task.id.clone(),
        title: task.title.clone(),
        scheduled_date: task.scheduled_date.clone(),
        message: reminder_message(&task.title, &due, phase),
        due_time: due,
        phase,
    })
}
