use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::{sort_tasks, ScheduleRepository, TaskRepository};
use crate::error::{CoreError, Result};
use crate::quality::{Frequency, QualitySchedule, QualityTask};

#[derive(Default)]
struct Tables {
    tasks: HashMap<String, QualityTask>,
    schedules: HashMap<String, QualitySchedule>,
}

/// Process-local store. Contents vanish when it is dropped.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with a small plant's worth of demo schedules and
    /// today's task instances.
    pub fn seeded(today: NaiveDate) -> Self {
        let store = Self::new();
        {
            let mut tables = store.lock();

            let mut torque = QualitySchedule::new(
                "Torque audit",
                Frequency::Daily,
                "07:30",
                "08:00",
                "08:15",
            );
            torque.id = "qs-torque-audit".to_string();
            torque.description = Some("Spot-check fastener torque on line 2".to_string());

            let mut calibration = QualitySchedule::new(
                "Gauge calibration",
                Frequency::Weekly,
                "13:00",
                "14:00",
                "14:30",
            );
            calibration.id = "qs-gauge-calibration".to_string();
            calibration.days_of_week = vec![1, 4];
            calibration.grace_period_after_minutes = 15;

            let mut walk = QualitySchedule::new(
                "5S walkthrough",
                Frequency::Monthly,
                "16:00",
                "16:30",
                "17:00",
            );
            walk.id = "qs-5s-walkthrough".to_string();
            walk.days_of_month = vec![1, 15];

            let seeds = [
                ("qt-torque-audit", &torque, "Torque audit line 2"),
                ("qt-gauge-calibration", &calibration, "Calibrate bore gauges"),
                ("qt-5s-walkthrough", &walk, "5S walkthrough cell B"),
            ];
            for (id, schedule, title) in seeds {
                let mut task = QualityTask::new(
                    title,
                    today,
                    schedule.window_start.clone(),
                    schedule.due_time.clone(),
                    schedule.window_end.clone(),
                );
                task.id = id.to_string();
                task.schedule_id = Some(schedule.id.clone());
                tables.tasks.insert(task.id.clone(), task);
            }

            for schedule in [torque, calibration, walk] {
                tables.schedules.insert(schedule.id.clone(), schedule);
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TaskRepository for MemoryStore {
    fn list_tasks(&self) -> Result<Vec<QualityTask>> {
        let mut tasks: Vec<_> = self.lock().tasks.values().cloned().collect();
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    fn get_task(&self, id: &str) -> Result<Option<QualityTask>> {
        Ok(self.lock().tasks.get(id).cloned())
    }

    fn create_task(&self, task: &QualityTask) -> Result<()> {
        let mut tables = self.lock();
        if tables.tasks.contains_key(&task.id) {
            return Err(CoreError::AlreadyExists {
                entity: "task",
                id: task.id.clone(),
            });
        }
        tables.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn update_task(&self, task: &QualityTask) -> Result<()> {
        let mut tables = self.lock();
        match tables.tasks.get_mut(&task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound {
                entity: "task",
                id: task.id.clone(),
            }),
        }
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        self.lock()
            .tasks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            })
    }
}

impl ScheduleRepository for MemoryStore {
    fn list_schedules(&self) -> Result<Vec<QualitySchedule>> {
        let mut schedules: Vec<_> = self.lock().schedules.values().cloned().collect();
        schedules.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(schedules)
    }

    fn get_schedule(&self, id: &str) -> Result<Option<QualitySchedule>> {
        Ok(self.lock().schedules.get(id).cloned())
    }

    fn create_schedule(&self, schedule: &QualitySchedule) -> Result<()> {
        let mut tables = self.lock();
        if tables.schedules.contains_key(&schedule.id) {
            return Err(CoreError::AlreadyExists {
                entity: "schedule",
                id: schedule.id.clone(),
            });
        }
        tables.schedules.insert(schedule.id.clone(), schedule.clone());
        Ok(())
    }

    fn update_schedule(&self, schedule: &QualitySchedule) -> Result<()> {
        let mut tables = self.lock();
        match tables.schedules.get_mut(&schedule.id) {
            Some(slot) => {
                *slot = schedule.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound {
                entity: "schedule",
                id: schedule.id.clone(),
            }),
        }
    }

    /// Linked tasks are kept with their `schedule_id` cleared.
    fn delete_schedule(&self, id: &str) -> Result<()> {
        let mut tables = self.lock();
        if tables.schedules.remove(id).is_none() {
            return Err(CoreError::NotFound {
                entity: "schedule",
                id: id.to_string(),
            });
        }
        for task in tables.tasks.values_mut() {
            if task.schedule_id.as_deref() == Some(id) {
                task.schedule_id = None;
            }
        }
        Ok(())
    }
}
