//! The "Generate Trailers" scheduled task.
//!
//! Wraps [`TrailerReconciler`] in the shape a host scheduler expects:
//! a stable identity, default triggers, and an async entry point that
//! takes a progress sink and a cancellation token.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::domain::{RunOutcome, TaskInfo, TaskTrigger};
use crate::library::Library;
use crate::trailers::{ProgressSink, TrailerConfig, TrailerReconciler};

/// Default trigger hour (local time)
pub const DEFAULT_TRIGGER_HOUR: u32 = 1;

/// Scheduled task that generates trailer strm files
pub struct GenerateTrailersTask<L: Library + 'static> {
    library: Arc<L>,
    config: TrailerConfig,
}

impl<L: Library + 'static> GenerateTrailersTask<L> {
    /// Create the task over a library
    pub fn new(library: Arc<L>, config: TrailerConfig) -> Self {
        Self { library, config }
    }

    /// Replace the configuration used by subsequent runs
    pub fn with_config(mut self, config: TrailerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TrailerConfig {
        &self.config
    }

    /// Identity shown by the scheduler
    pub fn info(&self) -> TaskInfo {
        TaskInfo::generate_trailers(&self.config.provider_name)
    }

    /// Triggers used when the user has not configured any
    pub fn default_triggers(&self) -> Vec<TaskTrigger> {
        TaskTrigger::daily_at(DEFAULT_TRIGGER_HOUR, 0)
            .into_iter()
            .collect()
    }

    /// Run the task once.
    ///
    /// The feature flag is checked before anything else. Otherwise the task
    /// yields once to the runtime and hands the reconciliation to the
    /// blocking pool, where items are processed one at a time.
    #[instrument(skip_all, fields(task = %self.info().key))]
    pub async fn execute(
        &self,
        progress: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> Result<RunOutcome> {
        if !self.config.enable_trailers {
            info!("Trailer generation is disabled");
            progress.report(0.0);
            return Ok(RunOutcome::Disabled);
        }

        tokio::task::yield_now().await;

        let library = Arc::clone(&self.library);
        let reconciler = TrailerReconciler::new(self.config.clone());

        tokio::task::spawn_blocking(move || {
            reconciler.run(library.as_ref(), &cancel, progress.as_ref())
        })
        .await
        .context("Trailer generation worker panicked")?
    }
}
