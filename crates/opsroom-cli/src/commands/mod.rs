pub mod config;
pub mod reminder;
pub mod schedule;
pub mod task;

use chrono::{Local, NaiveDateTime, NaiveTime};
use opsroom_core::repository::{MemoryStore, ScheduleRepository, TaskRepository};
use opsroom_core::window::parse_date;
use opsroom_core::{Config, QualityDb, StorageBackend, TimeOfDay};

/// Both repositories behind one handle.
pub trait Store: TaskRepository + ScheduleRepository {}

impl<T: TaskRepository + ScheduleRepository> Store for T {}

/// Open the configured backend, seeding demo records into an empty store
/// when asked to.
pub fn open_store(config: &Config) -> Result<Box<dyn Store>, Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let store: Box<dyn Store> = match config.storage.backend {
        StorageBackend::Memory if config.storage.seed_demo_data => {
            Box::new(MemoryStore::seeded(today))
        }
        StorageBackend::Memory => Box::new(MemoryStore::new()),
        StorageBackend::Sqlite => {
            let db = QualityDb::open()?;
            if config.storage.seed_demo_data && db.list_tasks()?.is_empty() {
                seed_into(&db, &MemoryStore::seeded(today))?;
            }
            Box::new(db)
        }
    };
    Ok(store)
}

fn seed_into(target: &dyn Store, demo: &MemoryStore) -> Result<(), Box<dyn std::error::Error>> {
    for schedule in demo.list_schedules()? {
        if target.get_schedule(&schedule.id)?.is_none() {
            target.create_schedule(&schedule)?;
        }
    }
    for task in demo.list_tasks()? {
        target.create_task(&task)?;
    }
    tracing::info!("seeded demo quality records");
    Ok(())
}

/// Build "now" from optional `YYYY-MM-DD` / `HH:MM` overrides, falling back
/// to the local clock for whichever is missing.
pub fn resolve_now(
    date: Option<&str>,
    at: Option<&str>,
) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    let local = Local::now().naive_local();
    let date = match date {
        Some(d) => parse_date(d)?,
        None => local.date(),
    };
    let time = match at {
        Some(t) => {
            let t = TimeOfDay::parse_field("at", t)?;
            NaiveTime::from_hms_opt(u32::from(t.hour()), u32::from(t.minute()), 0)
                .ok_or("invalid --at time")?
        }
        None => local.time(),
    };
    Ok(date.and_time(time))
}

/// Parse a comma-separated list of small integers such as `1,3,5`.
pub fn parse_day_list(raw: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .map_err(|_| -> Box<dyn std::error::Error> { format!("invalid day number: {s}").into() })
        })
        .collect()
}
