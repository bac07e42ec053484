//! Task execution.
//!
//! This module contains:
//! - Task: The "Generate Trailers" scheduled task
//! - Schedule: Daily trigger computation and the run loop

pub mod schedule;
pub mod task;

// Re-export commonly used types
pub use schedule::{run_daily, DailySchedule};
pub use task::{GenerateTrailersTask, DEFAULT_TRIGGER_HOUR};
