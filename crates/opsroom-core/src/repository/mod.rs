//! Storage-agnostic access to quality tasks and schedules.
//!
//! Callers depend on these traits only, so the in-memory store and the
//! SQLite database can be swapped without touching command code.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::quality::{QualitySchedule, QualityTask};
use crate::window::TimeOfDay;

/// CRUD over task instances.
pub trait TaskRepository {
    /// All tasks ordered by scheduled date, then due time.
    fn list_tasks(&self) -> Result<Vec<QualityTask>>;

    fn get_task(&self, id: &str) -> Result<Option<QualityTask>>;

    /// Fails with `AlreadyExists` when the id is taken.
    fn create_task(&self, task: &QualityTask) -> Result<()>;

    /// Fails with `NotFound` when no task has this id.
    fn update_task(&self, task: &QualityTask) -> Result<()>;

    /// Fails with `NotFound` when no task has this id.
    fn delete_task(&self, id: &str) -> Result<()>;
}

/// CRUD over recurring schedule definitions.
pub trait ScheduleRepository {
    /// All schedules ordered by name.
    fn list_schedules(&self) -> Result<Vec<QualitySchedule>>;

    fn get_schedule(&self, id: &str) -> Result<Option<QualitySchedule>>;

    fn create_schedule(&self, schedule: &QualitySchedule) -> Result<()>;

    fn update_schedule(&self, schedule: &QualitySchedule) -> Result<()>;

    fn delete_schedule(&self, id: &str) -> Result<()>;
}

/// Sort key shared by every backend.
///
/// Due times compare as clock minutes, so `9:00` lands before `10:00`;
/// text that does not parse sorts after every valid time.
pub(crate) fn sort_tasks(tasks: &mut [QualityTask]) {
    let due_minutes = |task: &QualityTask| TimeOfDay::parse(&task.due_time).ok();
    tasks.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then_with(|| match (due_minutes(a), due_minutes(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.due_time.cmp(&b.due_time),
            })
            .then_with(|| a.id.cmp(&b.id))
    });
}
