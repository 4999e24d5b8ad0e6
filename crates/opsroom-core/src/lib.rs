//! # opsroom Core Library
//!
//! Business logic for quality task scheduling in the opsroom operations
//! suite. Every operation is reachable from the standalone `opsroom` CLI;
//! UI front-ends are thin layers over this library.
//!
//! ## Architecture
//!
//! - **Window**: classifies a task instance into a reminder phase from its
//!   scheduled date and `HH:MM` window markers
//! - **Reminder**: canned operator-facing text per phase
//! - **Repository**: storage-agnostic task/schedule CRUD traits with an
//!   in-memory store and a SQLite database behind them
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`classify`]: the reminder phase classifier
//! - [`TaskRepository`]: CRUD seam for task instances
//! - [`QualityDb`]: SQLite-backed repository
//! - [`Config`]: Application configuration management

pub mod board;
pub mod clock;
pub mod error;
pub mod quality;
pub mod reminder;
pub mod repository;
pub mod storage;
pub mod window;

pub use board::{phase_counts, reminder_board, PhaseCounts, ReminderSettings};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use quality::{Frequency, QualitySchedule, QualityTask, TaskStatus};
pub use reminder::{reminder_message, task_reminder, TaskReminder};
pub use repository::{MemoryStore, ScheduleRepository, TaskRepository};
pub use storage::{Config, QualityDb, StorageBackend};
pub use window::{
    classify, classify_now, classify_with_lead, ReminderPhase, TaskTimeWindow, TimeOfDay,
    ALMOST_LATE_MINUTES,
};
