//! SQLite-based storage for quality schedules and task instances.

use std::path::Path;

use chrono::{DateTime, Utc};
use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::error::{CoreError, DatabaseError, Result};
use crate::quality::{Frequency, QualitySchedule, QualityTask, TaskStatus};
use crate::repository::{sort_tasks, ScheduleRepository, TaskRepository};

const TASK_COLUMNS: &str = "id, schedule_id, title, description, scheduled_date, window_start,
     due_time, window_end, status, assigned_to, notes, created_at, updated_at, completed_at";

const SCHEDULE_COLUMNS: &str = "id, name, description, frequency, days_of_week, days_of_month,
     window_start, due_time, window_end, grace_period_before_minutes,
     grace_period_after_minutes, is_active, created_at, updated_at";

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_day_list(raw: &str) -> Vec<u8> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn row_to_task(row: &rusqlite::Row) -> Result<QualityTask, rusqlite::Error> {
    let status_str: String = row.get(8)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    let completed_at: Option<String> = row.get(13)?;

    Ok(QualityTask {
        id: row.get(0)?,
        schedule_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        scheduled_date: row.get(4)?,
        window_start: row.get(5)?,
        due_time: row.get(6)?,
        window_end: row.get(7)?,
        status: TaskStatus::parse(&status_str).unwrap_or_default(),
        assigned_to: row.get(9)?,
        notes: row.get(10)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
        completed_at: completed_at.as_deref().map(parse_datetime_fallback),
    })
}

fn row_to_schedule(row: &rusqlite::Row) -> Result<QualitySchedule, rusqlite::Error> {
    let frequency: String = row.get(3)?;
    let days_of_week: String = row.get(4)?;
    let days_of_month: String = row.get(5)?;
    let created_at: String = row.get(12)?;
    let updated_at: String = row.get(13)?;

    Ok(QualitySchedule {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        frequency: Frequency::parse(&frequency).unwrap_or_default(),
        days_of_week: parse_day_list(&days_of_week),
        days_of_month: parse_day_list(&days_of_month),
        window_start: row.get(6)?,
        due_time: row.get(7)?,
        window_end: row.get(8)?,
        grace_period_before_minutes: row.get(9)?,
        grace_period_after_minutes: row.get(10)?,
        is_active: row.get(11)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

/// SQLite database for quality task storage.
pub struct QualityDb {
    conn: Connection,
}

impl QualityDb {
    /// Open the database at `<data_dir>/opsroom.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened,
    /// or if migration fails.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("opsroom.db");
        Self::open_at(&path)
    }

    /// Open (creating if needed) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened quality database");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS quality_schedules (
                    id                          TEXT PRIMARY KEY,
                    name                        TEXT NOT NULL,
                    description                 TEXT,
                    frequency                   TEXT NOT NULL DEFAULT 'daily',
                    days_of_week                TEXT NOT NULL DEFAULT '[]',
                    days_of_month               TEXT NOT NULL DEFAULT '[]',
                    window_start                TEXT NOT NULL,
                    due_time                    TEXT NOT NULL,
                    window_end                  TEXT NOT NULL,
                    grace_period_before_minutes INTEGER NOT NULL DEFAULT 0,
                    grace_period_after_minutes  INTEGER NOT NULL DEFAULT 0,
                    is_active                   INTEGER NOT NULL DEFAULT 1,
                    created_at                  TEXT NOT NULL,
                    updated_at                  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS quality_tasks (
                    id             TEXT PRIMARY KEY,
                    schedule_id    TEXT,
                    title          TEXT NOT NULL,
                    description    TEXT,
                    scheduled_date TEXT NOT NULL,
                    window_start   TEXT NOT NULL,
                    due_time       TEXT NOT NULL,
                    window_end     TEXT NOT NULL,
                    status         TEXT NOT NULL DEFAULT 'pending',
                    created_at     TEXT NOT NULL,
                    updated_at     TEXT NOT NULL,
                    completed_at   TEXT
                );
            "})
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Tasks scheduled on `date` (`YYYY-MM-DD`), in due-time order.
    pub fn list_tasks_on(&self, date: &str) -> Result<Vec<QualityTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM quality_tasks
             WHERE scheduled_date = ?1"
        ))?;
        let mut tasks = stmt
            .query_map(params![date], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    /// Tasks created for `schedule_id`.
    pub fn list_tasks_for_schedule(&self, schedule_id: &str) -> Result<Vec<QualityTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM quality_tasks
             WHERE schedule_id = ?1"
        ))?;
        let mut tasks = stmt
            .query_map(params![schedule_id], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        sort_tasks(&mut tasks);
        Ok(tasks)
    }
}

impl TaskRepository for QualityDb {
    fn list_tasks(&self) -> Result<Vec<QualityTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM quality_tasks"
        ))?;
        let mut tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    fn get_task(&self, id: &str) -> Result<Option<QualityTask>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM quality_tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn create_task(&self, task: &QualityTask) -> Result<()> {
        if self.get_task(&task.id)?.is_some() {
            return Err(CoreError::AlreadyExists {
                entity: "task",
                id: task.id.clone(),
            });
        }
        self.conn.execute(
            &format!(
                "INSERT INTO quality_tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                task.id,
                task.schedule_id,
                task.title,
                task.description,
                task.scheduled_date,
                task.window_start,
                task.due_time,
                task.window_end,
                task.status.as_str(),
                task.assigned_to,
                task.notes,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        tracing::info!(task_id = %task.id, "created quality task");
        Ok(())
    }

    fn update_task(&self, task: &QualityTask) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE quality_tasks
             SET schedule_id = ?2, title = ?3, description = ?4, scheduled_date = ?5,
                 window_start = ?6, due_time = ?7, window_end = ?8, status = ?9,
                 assigned_to = ?10, notes = ?11, updated_at = ?12, completed_at = ?13
             WHERE id = ?1",
            params![
                task.id,
                task.schedule_id,
                task.title,
                task.description,
                task.scheduled_date,
                task.window_start,
                task.due_time,
                task.window_end,
                task.status.as_str(),
                task.assigned_to,
                task.notes,
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                entity: "task",
                id: task.id.clone(),
            });
        }
        tracing::info!(task_id = %task.id, status = %task.status, "updated quality task");
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM quality_tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            });
        }
        tracing::info!(task_id = %id, "deleted quality task");
        Ok(())
    }
}

impl ScheduleRepository for QualityDb {
    fn list_schedules(&self) -> Result<Vec<QualitySchedule>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM quality_schedules ORDER BY name ASC, id ASC"
        ))?;
        let schedules = stmt
            .query_map([], row_to_schedule)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(schedules)
    }

    fn get_schedule(&self, id: &str) -> Result<Option<QualitySchedule>> {
        let schedule = self
            .conn
            .query_row(
                &format!("SELECT {SCHEDULE_COLUMNS} FROM quality_schedules WHERE id = ?1"),
                params![id],
                row_to_schedule,
            )
            .optional()?;
        Ok(schedule)
    }

    fn create_schedule(&self, schedule: &QualitySchedule) -> Result<()> {
        if self.get_schedule(&schedule.id)?.is_some() {
            return Err(CoreError::AlreadyExists {
                entity: "schedule",
                id: schedule.id.clone(),
            });
        }
        self.conn.execute(
            &format!(
                "INSERT INTO quality_schedules ({SCHEDULE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                schedule.id,
                schedule.name,
                schedule.description,
                schedule.frequency.as_str(),
                serde_json::to_string(&schedule.days_of_week)?,
                serde_json::to_string(&schedule.days_of_month)?,
                schedule.window_start,
                schedule.due_time,
                schedule.window_end,
                schedule.grace_period_before_minutes,
                schedule.grace_period_after_minutes,
                schedule.is_active,
                schedule.created_at.to_rfc3339(),
                schedule.updated_at.to_rfc3339(),
            ],
        )?;
        tracing::info!(schedule_id = %schedule.id, "created quality schedule");
        Ok(())
    }

    fn update_schedule(&self, schedule: &QualitySchedule) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE quality_schedules
             SET name = ?2, description = ?3, frequency = ?4, days_of_week = ?5,
                 days_of_month = ?6, window_start = ?7, due_time = ?8, window_end = ?9,
                 grace_period_before_minutes = ?10, grace_period_after_minutes = ?11,
                 is_active = ?12, updated_at = ?13
             WHERE id = ?1",
            params![
                schedule.id,
                schedule.name,
                schedule.description,
                schedule.frequency.as_str(),
                serde_json::to_string(&schedule.days_of_week)?,
                serde_json::to_string(&schedule.days_of_month)?,
                schedule.window_start,
                schedule.due_time,
                schedule.window_end,
                schedule.grace_period_before_minutes,
                schedule.grace_period_after_minutes,
                schedule.is_active,
                schedule.updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                entity: "schedule",
                id: schedule.id.clone(),
            });
        }
        tracing::info!(schedule_id = %schedule.id, "updated quality schedule");
        Ok(())
    }

    /// Tasks that referenced the schedule keep their rows; only the link is
    /// cleared.
    fn delete_schedule(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE quality_tasks SET schedule_id = NULL WHERE schedule_id = ?1",
            params![id],
        )?;
        let changed = tx.execute("DELETE FROM quality_schedules WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                entity: "schedule",
                id: id.to_string(),
            });
        }
        tx.commit()?;
        tracing::info!(schedule_id = %id, "deleted quality schedule");
        Ok(())
    }
}
