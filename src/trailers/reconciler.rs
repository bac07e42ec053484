//! Trailer reconciliation loop.
//!
//! Items are visited strictly in order on the calling thread. Cancellation
//! is only observed between items, so a file operation is never cut short;
//! a cancelled run leaves visited items converged and the rest untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::layout;
use super::{ProgressSink, TrailerConfig, TrailerError};
use crate::domain::{ItemOutcome, LibraryItem, ReconcileReport, RunOutcome};
use crate::library::{ItemQuery, Library};

/// Converges trailer folders with provider trailer URLs
#[derive(Debug, Clone)]
pub struct TrailerReconciler {
    config: TrailerConfig,
}

impl TrailerReconciler {
    /// Create a reconciler for one run's configuration
    pub fn new(config: TrailerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrailerConfig {
        &self.config
    }

    /// Query candidate items from `library` and reconcile them.
    ///
    /// Fails only when the candidate query itself fails; per-item errors are
    /// logged and counted in the report.
    pub fn run<L>(
        &self,
        library: &L,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome>
    where
        L: Library + ?Sized,
    {
        let span = tracing::info_span!("generate_trailers", run_id = %Uuid::new_v4());
        let _guard = span.enter();

        if !self.config.enable_trailers {
            info!("Trailer generation is disabled");
            progress.report(0.0);
            return Ok(RunOutcome::Disabled);
        }

        progress.report(0.0);

        let query = ItemQuery::for_provider(self.config.provider_name.as_str());
        let items = library
            .candidate_items(&query)
            .context("Failed to query candidate items")?;

        info!(
            "Generating trailers for {} item(s) from {}",
            items.len(),
            self.config.provider_name
        );

        let outcome = self.reconcile(library, &items, cancel, progress);
        if let Some(report) = outcome.report() {
            info!(
                written = report.written,
                up_to_date = report.up_to_date,
                pruned = report.pruned_files,
                ignored = report.ignored,
                failed = report.failed,
                "Trailer generation {}",
                if outcome.is_cancelled() { "cancelled" } else { "finished" }
            );
        }

        Ok(outcome)
    }

    /// Reconcile an already-selected snapshot of items
    pub fn reconcile<L>(
        &self,
        library: &L,
        items: &[LibraryItem],
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> RunOutcome
    where
        L: Library + ?Sized,
    {
        if !self.config.enable_trailers {
            progress.report(0.0);
            return RunOutcome::Disabled;
        }

        let total = items.len();
        let mut report = ReconcileReport::new(total);

        for (idx, item) in items.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Cancelled after {} of {} item(s)", idx, total);
                return RunOutcome::Cancelled(report);
            }

            progress.report(idx as f64 / total as f64 * 100.0);

            let outcome = match reconcile_item(library, item) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        "Failed to generate trailer for {} ({}): {}",
                        item.name,
                        item.containing_folder.display(),
                        e
                    );
                    ItemOutcome::Failed(e.to_string())
                }
            };

            report.record(&outcome);
        }

        progress.report(100.0);
        RunOutcome::Completed(report)
    }
}

/// Converge one item's trailers folder
fn reconcile_item<L>(library: &L, item: &LibraryItem) -> Result<ItemOutcome, TrailerError>
where
    L: Library + ?Sized,
{
    let folder = layout::trailers_folder(&item.containing_folder);

    if layout::is_ignored(&folder) {
        debug!("Skipping {}: {} present", item.name, layout::IGNORE_MARKER);
        return Ok(ItemOutcome::Ignored);
    }

    let url = library
        .resolve_trailer_url(item)
        .map_err(TrailerError::Lookup)?
        .filter(|url| !url.trim().is_empty());

    let Some(url) = url else {
        return prune(&folder);
    };

    let artifact = layout::artifact_path(&folder, &item.name)?;

    if !is_stale(&artifact, item.last_saved_utc())? {
        debug!("Trailer up to date: {}", artifact.display());
        return Ok(ItemOutcome::UpToDate);
    }

    fs::create_dir_all(&folder).map_err(TrailerError::io("create", &folder))?;
    // Rust strings are UTF-8 without a BOM; write replaces the whole file.
    fs::write(&artifact, url.as_bytes()).map_err(TrailerError::io("write", &artifact))?;

    info!("Wrote trailer {}", artifact.display());
    Ok(ItemOutcome::Written)
}

/// Artifact is missing or strictly older than the item's last save
fn is_stale(artifact: &Path, last_saved: DateTime<Utc>) -> Result<bool, TrailerError> {
    let metadata = match fs::metadata(artifact) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(TrailerError::io("inspect", artifact)(e)),
    };

    let modified: DateTime<Utc> = metadata
        .modified()
        .map_err(TrailerError::io("read mtime of", artifact))?
        .into();

    Ok(modified < last_saved)
}

/// Delete generated trailers from a folder, then the folder if it is empty
fn prune(folder: &Path) -> Result<ItemOutcome, TrailerError> {
    if !folder.is_dir() {
        return Ok(ItemOutcome::NoTrailer);
    }

    let mut removed = 0;
    for entry in fs::read_dir(folder).map_err(TrailerError::io("list", folder))? {
        let entry = entry.map_err(TrailerError::io("list", folder))?;
        let path = entry.path();

        let is_file = entry
            .file_type()
            .map_err(TrailerError::io("inspect", &path))?
            .is_file();
        let is_trailer = entry
            .file_name()
            .to_str()
            .map(layout::is_trailer_file_name)
            .unwrap_or(false);

        if is_file && is_trailer {
            fs::remove_file(&path).map_err(TrailerError::io("delete", &path))?;
            info!("Deleted obsolete trailer {}", path.display());
            removed += 1;
        }
    }

    let folder_removed = remove_dir_if_empty(folder);

    if removed == 0 && !folder_removed {
        Ok(ItemOutcome::NoTrailer)
    } else {
        Ok(ItemOutcome::Pruned {
            removed,
            folder_removed,
        })
    }
}

/// Remove `folder` if it has no entries; failures are not errors
fn remove_dir_if_empty(folder: &Path) -> bool {
    let is_empty = match fs::read_dir(folder) {
        Ok(mut entries) => entries.next().is_none(),
        Err(e) => {
            debug!("Could not list {}: {}", folder.display(), e);
            return false;
        }
    };

    if !is_empty {
        return false;
    }

    match fs::remove_dir(folder) {
        Ok(()) => true,
        Err(e) => {
            debug!("Could not remove {}: {}", folder.display(), e);
            false
        }
    }
}
