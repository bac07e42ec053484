//! Outcome of a trailer generation run.
//!
//! A run visits every candidate item once; each visit yields an
//! [`ItemOutcome`] which is folded into a [`ReconcileReport`].

use serde::Serialize;

/// What happened to a single item during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// `.ignore` marker present, folder left alone
    Ignored,

    /// Artifact created or overwritten
    Written,

    /// Artifact already newer than the item
    UpToDate,

    /// No trailer URL; stale artifacts were deleted
    Pruned { removed: usize, folder_removed: bool },

    /// No trailer URL and nothing on disk to clean up
    NoTrailer,

    /// Processing failed; the run carried on
    Failed(String),
}

/// Aggregated counts for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Number of candidate items
    pub total: usize,

    /// Items visited before the run finished or was cancelled
    pub processed: usize,

    pub written: usize,
    pub up_to_date: usize,
    pub ignored: usize,
    pub no_trailer: usize,
    pub pruned_files: usize,
    pub removed_folders: usize,
    pub failed: usize,
}

impl ReconcileReport {
    /// Create an empty report for `total` candidates
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Fold one item outcome into the counts
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.processed += 1;
        match outcome {
            ItemOutcome::Ignored => self.ignored += 1,
            ItemOutcome::Written => self.written += 1,
            ItemOutcome::UpToDate => self.up_to_date += 1,
            ItemOutcome::Pruned {
                removed,
                folder_removed,
            } => {
                self.no_trailer += 1;
                self.pruned_files += removed;
                if *folder_removed {
                    self.removed_folders += 1;
                }
            }
            ItemOutcome::NoTrailer => self.no_trailer += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Items left unvisited (non-zero only after cancellation)
    pub fn remaining(&self) -> usize {
        self.total - self.processed
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Feature flag off; nothing was touched
    Disabled,

    /// Every candidate was visited
    Completed(ReconcileReport),

    /// Cancellation was requested at an item boundary
    Cancelled(ReconcileReport),
}

impl RunOutcome {
    /// The report, if the run got as far as visiting items
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            Self::Disabled => None,
            Self::Completed(report) | Self::Cancelled(report) => Some(report),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
