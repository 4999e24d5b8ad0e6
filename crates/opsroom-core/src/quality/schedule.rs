use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::window::TimeOfDay;

/// How often a schedule is meant to recur.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "custom" => Some(Frequency::Custom),
            _ => None,
        }
    }
}

/// A recurring quality check definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualitySchedule {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    /// 0=Sun ... 6=Sat
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// 1..=31
    #[serde(default)]
    pub days_of_month: Vec<u8>,
    pub window_start: String,
    pub due_time: String,
    pub window_end: String,
    #[serde(default)]
    pub grace_period_before_minutes: u32,
    #[serde(default)]
    pub grace_period_after_minutes: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QualitySchedule {
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        window_start: impl Into<String>,
        due_time: impl Into<String>,
        window_end: impl Into<String>,
    ) -> Self {
        let (window_start, due_time, window_end): (String, String, String) =
            (window_start.into(), due_time.into(), window_end.into());
        let now = Utc::now();
        Self {
            id: format!("qs-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            description: None,
            frequency,
            days_of_week: Vec::new(),
            days_of_month: Vec::new(),
            window_start: TimeOfDay::canonical(&window_start),
            due_time: TimeOfDay::canonical(&due_time),
            window_end: TimeOfDay::canonical(&window_end),
            grace_period_before_minutes: 0,
            grace_period_after_minutes: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check clock fields and recurrence day lists.
    pub fn validate(&self) -> Result<(), ValidationError> {
        TimeOfDay::parse_field("window_start", &self.window_start)?;
        TimeOfDay::parse_field("due_time", &self.due_time)?;
        TimeOfDay::parse_field("window_end", &self.window_end)?;

        if let Some(day) = self.days_of_week.iter().find(|d| **d > 6) {
            return Err(ValidationError::InvalidValue {
                field: "days_of_week".to_string(),
                message: format!("{day} is not a weekday (0=Sun..6=Sat)"),
            });
        }
        if let Some(day) = self.days_of_month.iter().find(|d| **d == 0 || **d > 31) {
            return Err(ValidationError::InvalidValue {
                field: "days_of_month".to_string(),
                message: format!("{day} is not a day of month (1..31)"),
            });
        }
        Ok(())
    }
}
