//! Integration tests for reminder classification through the repositories.

use chrono::{NaiveDate, NaiveDateTime};
use opsroom_core::{
    classify, classify_now, phase_counts, reminder_board, reminder_message, FixedClock,
    Frequency, MemoryStore, QualityDb, QualitySchedule, QualityTask, ReminderPhase,
    ReminderSettings, ScheduleRepository, TaskRepository, TaskStatus,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn at(date: &str, hm: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {hm}"), "%Y-%m-%d %H:%M").unwrap()
}

fn inspection() -> QualityTask {
    let mut task = QualityTask::new("Weld inspection", day(), "09:00", "10:00", "10:15");
    task.id = "qt-weld".to_string();
    task
}

const REFERENCE_TABLE: [(&str, ReminderPhase); 8] = [
    ("08:59", ReminderPhase::Upcoming),
    ("09:00", ReminderPhase::CanStart),
    ("09:59", ReminderPhase::CanStart),
    ("10:00", ReminderPhase::DueNow),
    ("10:09", ReminderPhase::DueNow),
    ("10:10", ReminderPhase::AlmostLate),
    ("10:15", ReminderPhase::AlmostLate),
    ("10:16", ReminderPhase::Overdue),
];

fn assert_reference_table<R>(repo: &R)
where
    R: TaskRepository + ScheduleRepository,
{
    for (hm, expected) in REFERENCE_TABLE {
        let board =
            reminder_board(repo, at("2026-10-19", hm), ReminderSettings::default()).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].phase, expected, "at {hm}");
        assert_eq!(
            board[0].message,
            reminder_message("Weld inspection", "10:00", expected)
        );
    }
}

#[test]
fn memory_store_board_follows_reference_table() {
    let store = MemoryStore::new();
    store.create_task(&inspection()).unwrap();
    assert_reference_table(&store);
}

#[test]
fn sqlite_board_follows_reference_table() {
    let db = QualityDb::open_memory().unwrap();
    db.create_task(&inspection()).unwrap();
    assert_reference_table(&db);
}

#[test]
fn yesterdays_unfinished_task_is_still_upcoming() {
    let db = QualityDb::open_memory().unwrap();
    db.create_task(&inspection()).unwrap();

    let board =
        reminder_board(&db, at("2026-10-20", "12:00"), ReminderSettings::default()).unwrap();
    assert_eq!(board[0].phase, ReminderPhase::Upcoming);
    assert_eq!(board[0].message, "Weld inspection is scheduled for 10:00");
}

#[test]
fn completing_a_task_removes_it_from_the_board() {
    let db = QualityDb::open_memory().unwrap();
    let mut task = inspection();
    db.create_task(&task).unwrap();

    task.start().unwrap();
    db.update_task(&task).unwrap();
    let board =
        reminder_board(&db, at("2026-10-19", "10:12"), ReminderSettings::default()).unwrap();
    assert_eq!(board[0].phase, ReminderPhase::AlmostLate);

    task.complete().unwrap();
    db.update_task(&task).unwrap();
    let board =
        reminder_board(&db, at("2026-10-19", "10:12"), ReminderSettings::default()).unwrap();
    assert!(board.is_empty());
    assert_eq!(
        db.get_task("qt-weld").unwrap().unwrap().status,
        TaskStatus::Completed
    );
}

#[test]
fn file_backed_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opsroom.db");
    {
        let db = QualityDb::open_at(&path).unwrap();
        db.create_task(&inspection()).unwrap();
    }
    let db = QualityDb::open_at(&path).unwrap();
    let task = db.get_task("qt-weld").unwrap().unwrap();
    let window = task.time_window().unwrap();
    assert_eq!(
        classify(at("2026-10-19", "10:10"), &window),
        ReminderPhase::AlmostLate
    );
}

#[test]
fn seeded_store_and_clock_drive_the_same_phases() {
    let store = MemoryStore::seeded(day());
    let clock = FixedClock(at("2026-10-19", "08:10"));

    let board = reminder_board(&store, at("2026-10-19", "08:10"), ReminderSettings::default())
        .unwrap();
    for reminder in &board {
        let task = store.get_task(&reminder.task_id).unwrap().unwrap();
        let window = task.time_window().unwrap();
        assert_eq!(classify_now(&clock, &window), reminder.phase);
    }
    let counts = phase_counts(&board);
    assert_eq!(counts.almost_late, 1);
    assert_eq!(counts.upcoming, 2);
}

fn assert_sorted_by_clock_time<R: TaskRepository>(repo: &R) {
    let ten = QualityTask::new("Ten", day(), "09:30", "10:00", "10:15");
    let eight = QualityTask::new("Eight", day(), "7:30", "8:00", "8:15");
    // rows written before times were normalized on create
    let mut nine = QualityTask::new("Nine", day(), "08:30", "09:00", "09:15");
    nine.due_time = "9:00".to_string();
    for task in [&ten, &nine, &eight] {
        repo.create_task(task).unwrap();
    }

    let titles: Vec<_> = repo
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["Eight", "Nine", "Ten"]);
    assert_eq!(repo.get_task(&eight.id).unwrap().unwrap().due_time, "08:00");
}

#[test]
fn memory_store_orders_single_digit_hours_by_time() {
    assert_sorted_by_clock_time(&MemoryStore::new());
}

#[test]
fn sqlite_orders_single_digit_hours_by_time() {
    let db = QualityDb::open_memory().unwrap();
    assert_sorted_by_clock_time(&db);
    let on_day: Vec<_> = db
        .list_tasks_on("2026-10-19")
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(on_day, ["Eight", "Nine", "Ten"]);
}

fn assert_schedule_delete_unlinks_tasks<R>(repo: &R)
where
    R: TaskRepository + ScheduleRepository,
{
    let schedule = QualitySchedule::new("Weld audit", Frequency::Daily, "09:00", "10:00", "10:15");
    repo.create_schedule(&schedule).unwrap();
    let mut task = inspection();
    task.schedule_id = Some(schedule.id.clone());
    repo.create_task(&task).unwrap();

    repo.delete_schedule(&schedule.id).unwrap();

    assert!(repo.get_schedule(&schedule.id).unwrap().is_none());
    let kept = repo.get_task("qt-weld").unwrap().unwrap();
    assert!(kept.schedule_id.is_none());
}

#[test]
fn memory_store_schedule_delete_unlinks_tasks() {
    assert_schedule_delete_unlinks_tasks(&MemoryStore::new());
}

#[test]
fn sqlite_schedule_delete_unlinks_tasks() {
    assert_schedule_delete_unlinks_tasks(&QualityDb::open_memory().unwrap());
}
