//! Database schema migrations for opsroom.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use indoc::indoc;
use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to [`SCHEMA_VERSION`].
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < SCHEMA_VERSION {
        tracing::info!(from = current_version, to = SCHEMA_VERSION, "migrated schema");
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub(crate) fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: baseline. Tables are created by `QualityDb::migrate()`.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)
}

/// Migration v2: task assignment and free-text notes.
///
/// Adds `assigned_to` and `notes` to `quality_tasks`, plus an index for the
/// per-day listing the reminder board runs.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(indoc! {"
        ALTER TABLE quality_tasks ADD COLUMN assigned_to TEXT;
        ALTER TABLE quality_tasks ADD COLUMN notes TEXT;
        CREATE INDEX IF NOT EXISTS idx_quality_tasks_date
            ON quality_tasks(scheduled_date, due_time);
    "})?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_schema(conn: &Connection) {
        conn.execute_batch(indoc! {"
            CREATE TABLE quality_tasks (
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
        .unwrap();
    }

    #[test]
    fn migrate_from_scratch_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        v1_schema(&conn);
        conn.execute(
            "INSERT INTO quality_tasks (id, title, scheduled_date, window_start, due_time, window_end, created_at, updated_at)
             VALUES ('qt-1', 'Old task', '2026-10-01', '09:00', '10:00', '10:15', '2026-10-01T08:00:00Z', '2026-10-01T08:00:00Z')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        let (assigned, notes): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT assigned_to, notes FROM quality_tasks WHERE id = 'qt-1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(assigned.is_none());
        assert!(notes.is_none());
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        v1_schema(&conn);
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }
}
