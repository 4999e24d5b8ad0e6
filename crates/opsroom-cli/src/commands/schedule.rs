use chrono::Utc;
use clap::Subcommand;
use opsroom_core::{Config, CoreError, Frequency, QualitySchedule, TimeOfDay};

use super::{open_store, parse_day_list, Store};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Create a recurring quality schedule
    Create {
        /// Schedule name
        name: String,
        /// daily, weekly, monthly or custom
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Window start, HH:MM
        #[arg(long)]
        start: String,
        /// Due time, HH:MM
        #[arg(long)]
        due: String,
        /// Window end, HH:MM
        #[arg(long)]
        end: String,
        /// Comma-separated weekdays, 0=Sun..6=Sat
        #[arg(long)]
        days_of_week: Option<String>,
        /// Comma-separated days of month, 1..31
        #[arg(long)]
        days_of_month: Option<String>,
        #[arg(long, default_value = "0")]
        grace_before: u32,
        #[arg(long, default_value = "0")]
        grace_after: u32,
        #[arg(long)]
        description: Option<String>,
    },
    /// List schedules
    List {
        /// Only active schedules
        #[arg(long)]
        active: bool,
    },
    /// Get schedule details
    Get { id: String },
    /// Update a schedule
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        days_of_week: Option<String>,
        #[arg(long)]
        days_of_month: Option<String>,
        #[arg(long)]
        grace_before: Option<u32>,
        #[arg(long)]
        grace_after: Option<u32>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a schedule (its tasks are kept, unlinked)
    Delete { id: String },
}

fn parse_frequency(raw: &str) -> Result<Frequency, Box<dyn std::error::Error>> {
    Ok(Frequency::parse(raw).ok_or_else(|| format!("unknown frequency: {raw}"))?)
}

fn load_schedule(
    store: &dyn Store,
    id: &str,
) -> Result<QualitySchedule, Box<dyn std::error::Error>> {
    Ok(store.get_schedule(id)?.ok_or_else(|| CoreError::NotFound {
        entity: "schedule",
        id: id.to_string(),
    })?)
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;

    match action {
        ScheduleAction::Create {
            name,
            frequency,
            start,
            due,
            end,
            days_of_week,
            days_of_month,
            grace_before,
            grace_after,
            description,
        } => {
            let mut schedule =
                QualitySchedule::new(name, parse_frequency(&frequency)?, start, due, end);
            if let Some(days) = days_of_week { schedule.days_of_week = parse_day_list(&days)?; }
            if let Some(days) = days_of_month { schedule.days_of_month = parse_day_list(&days)?; }
            schedule.grace_period_before_minutes = grace_before;
            schedule.grace_period_after_minutes = grace_after;
            schedule.description = description;
            schedule.validate()?;

            store.create_schedule(&schedule)?;
            println!("Schedule created: {}", schedule.id);
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        ScheduleAction::List { active } => {
            let schedules: Vec<_> = store
                .list_schedules()?
                .into_iter()
                .filter(|s| !active || s.is_active)
                .collect();
            println!("{}", serde_json::to_string_pretty(&schedules)?);
        }
        ScheduleAction::Get { id } => {
            let schedule = load_schedule(store.as_ref(), &id)?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        ScheduleAction::Update {
            id,
            name,
            frequency,
            start,
            due,
            end,
            days_of_week,
            days_of_month,
            grace_before,
            grace_after,
            active,
            description,
        } => {
            let mut schedule = load_schedule(store.as_ref(), &id)?;

            if let Some(n) = name { schedule.name = n; }
            if let Some(f) = frequency { schedule.frequency = parse_frequency(&f)?; }
            if let Some(s) = start { schedule.window_start = TimeOfDay::canonical(&s); }
            if let Some(d) = due { schedule.due_time = TimeOfDay::canonical(&d); }
            if let Some(e) = end { schedule.window_end = TimeOfDay::canonical(&e); }
            if let Some(days) = days_of_week { schedule.days_of_week = parse_day_list(&days)?; }
            if let Some(days) = days_of_month { schedule.days_of_month = parse_day_list(&days)?; }
            if let Some(g) = grace_before { schedule.grace_period_before_minutes = g; }
            if let Some(g) = grace_after { schedule.grace_period_after_minutes = g; }
            if let Some(a) = active { schedule.is_active = a; }
            if let Some(d) = description { schedule.description = Some(d); }
            schedule.validate()?;
            schedule.updated_at = Utc::now();

            store.update_schedule(&schedule)?;
            println!("Schedule updated:");
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        ScheduleAction::Delete { id } => {
            store.delete_schedule(&id)?;
            println!("Schedule deleted: {id}");
        }
    }
    Ok(())
}
