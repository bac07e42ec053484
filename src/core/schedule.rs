//! Daily scheduling for the trailer task.
//!
//! Runs are strictly sequential: the loop sleeps until the next trigger,
//! awaits the job, then computes the following trigger. A failed run is
//! only logged; the next day's run is the retry.

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::{RunOutcome, TaskTrigger};

/// A once-a-day schedule at a local time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time_of_day: NaiveTime,
}

impl DailySchedule {
    pub fn new(time_of_day: NaiveTime) -> Self {
        Self { time_of_day }
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    /// First instant strictly after `now` whose wall-clock time matches
    pub fn next_fire_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let local_now = now.naive_local();
        let mut candidate = local_now.date().and_time(self.time_of_day);
        if candidate <= local_now {
            candidate += Duration::days(1);
        }

        let tz = now.timezone();
        tz.from_local_datetime(&candidate)
            .earliest()
            // Trigger time falls into a DST gap; fire once the clocks have moved on.
            .or_else(|| tz.from_local_datetime(&(candidate + Duration::hours(1))).earliest())
            .unwrap_or_else(|| now.clone() + Duration::days(1))
    }

    /// Time left until the next trigger
    pub fn until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> std::time::Duration {
        (self.next_fire_after(now) - now.clone())
            .to_std()
            .unwrap_or_default()
    }
}

impl From<TaskTrigger> for DailySchedule {
    fn from(trigger: TaskTrigger) -> Self {
        match trigger {
            TaskTrigger::Daily { time_of_day } => Self::new(time_of_day),
        }
    }
}

/// Run `job` every day at the scheduled time until `cancel` fires.
///
/// The token is also the job's cancellation signal, so cancelling mid-run
/// stops the current run at its next item boundary before the loop exits.
pub async fn run_daily<F, Fut>(schedule: DailySchedule, cancel: CancellationToken, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RunOutcome>>,
{
    loop {
        let now = Local::now();
        let next = schedule.next_fire_after(&now);
        info!("Next trailer run at {}", next.format("%Y-%m-%d %H:%M"));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Scheduler stopping...");
                break;
            }
            _ = tokio::time::sleep(schedule.until_next(&now)) => {}
        }

        match job().await {
            Ok(RunOutcome::Disabled) => info!("Trailer generation skipped (disabled)"),
            Ok(RunOutcome::Completed(report)) => {
                info!("Trailer run finished: {} written, {} failed", report.written, report.failed)
            }
            Ok(RunOutcome::Cancelled(report)) => {
                info!("Trailer run cancelled after {} of {} item(s)", report.processed, report.total);
            }
            Err(e) => error!("Trailer run failed: {:#}", e),
        }

        if cancel.is_cancelled() {
            break;
        }
    }
}
