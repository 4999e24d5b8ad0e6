//! Reminder commands: the task board and one-off classification.

use clap::Subcommand;
use opsroom_core::{
    classify_with_lead, phase_counts, reminder_board, reminder_message, Config, TaskTimeWindow,
    ALMOST_LATE_MINUTES,
};
use serde::Serialize;

use super::{open_store, resolve_now};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Show the reminder phase of every open task
    Status {
        /// Evaluate as of this date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Evaluate as of this time, HH:MM (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Classify a single window without touching storage
    Classify {
        /// Scheduled date of the task, YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        due: String,
        #[arg(long)]
        end: String,
        /// Current date, YYYY-MM-DD (default: today)
        #[arg(long)]
        today: Option<String>,
        /// Current time, HH:MM (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Minutes before window end that count as almost late
        #[arg(long, default_value_t = ALMOST_LATE_MINUTES)]
        lead: u32,
        /// Title used for the reminder line
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Serialize)]
struct StatusReport<'a> {
    evaluated_at: String,
    counts: opsroom_core::PhaseCounts,
    reminders: &'a [opsroom_core::TaskReminder],
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ReminderAction::Status { date, at, json } => {
            let config = Config::load_or_default();
            let store = open_store(&config)?;
            let now = resolve_now(date.as_deref(), at.as_deref())?;

            let reminders = reminder_board(store.as_ref(), now, config.reminder_settings())?;
            let counts = phase_counts(&reminders);

            if json {
                let report = StatusReport {
                    evaluated_at: now.format("%Y-%m-%d %H:%M").to_string(),
                    counts,
                    reminders: &reminders,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if reminders.is_empty() {
                println!("No open tasks.");
            } else {
                for reminder in &reminders {
                    println!("[{:<11}] {}  {}", reminder.phase, reminder.task_id, reminder.message);
                }
                println!(
                    "{} open, {} need attention",
                    reminders.len(),
                    counts.needs_attention()
                );
            }
        }
        ReminderAction::Classify {
            date,
            start,
            due,
            end,
            today,
            at,
            lead,
            title,
        } => {
            let window = TaskTimeWindow::from_strings(&date, &start, &due, &end)?;
            if let Err(err) = window.validate_with(lead) {
                tracing::warn!(%err, "window out of order, classifying anyway");
            }
            let now = resolve_now(today.as_deref(), at.as_deref())?;
            let phase = classify_with_lead(now, &window, lead);
            match title {
                Some(title) => println!(
                    "{phase}: {}",
                    reminder_message(&title, &window.due_time.to_string(), phase)
                ),
                None => println!("{phase}"),
            }
        }
    }
    Ok(())
}
