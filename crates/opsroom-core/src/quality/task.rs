use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::window::{TaskTimeWindow, TimeOfDay};

/// Lifecycle of a task instance.
///
///   PENDING ──> IN_PROGRESS ──> COMPLETED
///      │             │
///      └─────────────┴────────> SKIPPED
///
/// A pending task may also be completed directly. Completed and skipped
/// are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl TaskStatus {
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => matches!(
                to,
                TaskStatus::InProgress | TaskStatus::Completed | TaskStatus::Skipped
            ),
            TaskStatus::InProgress => matches!(to, TaskStatus::Completed | TaskStatus::Skipped),
            TaskStatus::Completed | TaskStatus::Skipped => false,
        }
    }

    /// Still waiting on someone to do the work.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
        }
    }

    /// Parse the storage form, `None` for unknown text.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "skipped" => Some(TaskStatus::Skipped),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an invalid status transition is attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid status transition: {from} -> {to}")]
pub struct TaskTransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// One dated quality task instance.
///
/// Times are kept as the `HH:MM` text they were entered with; the
/// [`TaskTimeWindow`] is parsed from them on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityTask {
    pub id: String,
    /// Schedule this instance was created for, if any.
    pub schedule_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub scheduled_date: String,
    pub window_start: String,
    pub due_time: String,
    pub window_end: String,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QualityTask {
    /// Create a pending task. Clock fields that parse are stored as `HH:MM`;
    /// anything else is kept verbatim, so call [`QualityTask::time_window`]
    /// to check them.
    pub fn new(
        title: impl Into<String>,
        scheduled_date: NaiveDate,
        window_start: impl Into<String>,
        due_time: impl Into<String>,
        window_end: impl Into<String>,
    ) -> Self {
        let (window_start, due_time, window_end): (String, String, String) =
            (window_start.into(), due_time.into(), window_end.into());
        let now = Utc::now();
        Self {
            id: format!("qt-{}", uuid::Uuid::new_v4()),
            schedule_id: None,
            title: title.into(),
            description: None,
            scheduled_date: scheduled_date.format("%Y-%m-%d").to_string(),
            window_start: TimeOfDay::canonical(&window_start),
            due_time: TimeOfDay::canonical(&due_time),
            window_end: TimeOfDay::canonical(&window_end),
            status: TaskStatus::Pending,
            assigned_to: None,
            notes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Parse this record's date and clock fields.
    ///
    /// # Errors
    /// Returns the first date or time field that fails to parse.
    pub fn time_window(&self) -> Result<TaskTimeWindow, ValidationError> {
        TaskTimeWindow::from_strings(
            &self.scheduled_date,
            &self.window_start,
            &self.due_time,
            &self.window_end,
        )
    }

    pub fn transition_to(&mut self, next: TaskStatus) -> Result<(), TaskTransitionError> {
        if !self.status.can_transition_to(&next) {
            return Err(TaskTransitionError {
                from: self.status,
                to: next,
            });
        }
        let now = Utc::now();
        if next == TaskStatus::Completed {
            self.completed_at = Some(now);
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), TaskTransitionError> {
        self.transition_to(TaskStatus::InProgress)
    }

    pub fn complete(&mut self) -> Result<(), TaskTransitionError> {
        self.transition_to(TaskStatus::Completed)
    }

    pub fn skip(&mut self) -> Result<(), TaskTransitionError> {
        self.transition_to(TaskStatus::Skipped)
    }
}
