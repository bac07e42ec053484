//! Scheduled task identity and triggers.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Identity of a scheduled task as shown by the host scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Stable key used to persist trigger settings
    pub key: String,

    /// Human-readable task name
    pub name: String,

    /// One-line description
    pub description: String,

    /// Category the task is listed under
    pub category: String,
}

impl TaskInfo {
    /// Identity of the trailer generation task for a provider
    pub fn generate_trailers(provider: &str) -> Self {
        Self {
            key: format!("{}GenerateTrailers", provider),
            name: "Generate Trailers".to_string(),
            description: format!("Generates video trailers provided by {} in library.", provider),
            category: provider.to_string(),
        }
    }
}

/// When a scheduled task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskTrigger {
    /// Once a day at a local time of day
    Daily { time_of_day: NaiveTime },
}

impl TaskTrigger {
    /// Daily trigger at the given local hour and minute
    pub fn daily_at(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|time_of_day| Self::Daily { time_of_day })
    }
}
