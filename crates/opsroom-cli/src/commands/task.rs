//! Quality task commands for CLI.

use chrono::{Local, Utc};
use clap::Subcommand;
use opsroom_core::window::parse_date;
use opsroom_core::{Config, CoreError, QualityTask, TaskStatus, TimeOfDay};

use super::{open_store, Store};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task instance
    Create {
        /// Task title
        title: String,
        /// Scheduled date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Window start, HH:MM
        #[arg(long)]
        start: String,
        /// Due time, HH:MM
        #[arg(long)]
        due: String,
        /// Window end, HH:MM
        #[arg(long)]
        end: String,
        /// Schedule this instance belongs to
        #[arg(long)]
        schedule_id: Option<String>,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Person responsible
        #[arg(long)]
        assigned_to: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks scheduled on this date
        #[arg(long)]
        date: Option<String>,
        /// Only tasks with this status (pending, in_progress, completed, skipped)
        #[arg(long)]
        status: Option<String>,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a task as in progress
    Start { id: String },
    /// Mark a task as completed
    Complete { id: String },
    /// Mark a task as skipped
    Skip { id: String },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

/// Reject tasks whose window does not parse or is out of order.
fn check_window(task: &QualityTask) -> Result<(), Box<dyn std::error::Error>> {
    task.time_window()?.validate()?;
    Ok(())
}

fn load_task(store: &dyn Store, id: &str) -> Result<QualityTask, Box<dyn std::error::Error>> {
    Ok(store.get_task(id)?.ok_or_else(|| CoreError::NotFound {
        entity: "task",
        id: id.to_string(),
    })?)
}

fn transition(
    store: &dyn Store,
    id: &str,
    next: TaskStatus,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut task = load_task(store, id)?;
    task.transition_to(next)?;
    store.update_task(&task)?;
    println!("Task {id}: {}", task.status);
    Ok(())
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;
    let store = store.as_ref();

    match action {
        TaskAction::Create {
            title,
            date,
            start,
            due,
            end,
            schedule_id,
            description,
            assigned_to,
        } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };
            if let Some(ref sid) = schedule_id {
                store
                    .get_schedule(sid)?
                    .ok_or_else(|| format!("Schedule not found: {sid}"))?;
            }
            let mut task = QualityTask::new(title, date, start, due, end);
            task.schedule_id = schedule_id;
            task.description = description;
            task.assigned_to = assigned_to;
            check_window(&task)?;

            store.create_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { date, status } => {
            let status = match status {
                Some(s) => Some(TaskStatus::parse(&s).ok_or(format!("unknown status: {s}"))?),
                None => None,
            };
            let filtered: Vec<_> = store
                .list_tasks()?
                .into_iter()
                .filter(|task| date.as_ref().map_or(true, |d| &task.scheduled_date == d))
                .filter(|task| status.map_or(true, |s| task.status == s))
                .collect();
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        TaskAction::Get { id } => {
            let task = load_task(store, &id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Update {
            id,
            title,
            description,
            date,
            start,
            due,
            end,
            assigned_to,
            notes,
        } => {
            let mut task = load_task(store, &id)?;

            if let Some(t) = title { task.title = t; }
            if let Some(d) = description { task.description = Some(d); }
            if let Some(d) = date { task.scheduled_date = parse_date(&d)?.format("%Y-%m-%d").to_string(); }
            if let Some(s) = start { task.window_start = TimeOfDay::canonical(&s); }
            if let Some(d) = due { task.due_time = TimeOfDay::canonical(&d); }
            if let Some(e) = end { task.window_end = TimeOfDay::canonical(&e); }
            if let Some(a) = assigned_to { task.assigned_to = Some(a); }
            if let Some(n) = notes { task.notes = Some(n); }
            check_window(&task)?;
            task.updated_at = Utc::now();

            store.update_task(&task)?;
            println!("Task updated:");
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Start { id } => transition(store, &id, TaskStatus::InProgress)?,
        TaskAction::Complete { id } => transition(store, &id, TaskStatus::Completed)?,
        TaskAction::Skip { id } => transition(store, &id, TaskStatus::Skipped)?,
        TaskAction::Delete { id } => {
            store.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
