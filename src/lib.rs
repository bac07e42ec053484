//! trailer-sync - Provider trailers as local strm files
//!
//! Scans a media library for items whose metadata provider publishes a
//! remote trailer URL and materializes each URL as a small pointer file
//! that media players stream from.
//!
//! # Architecture
//!
//! The work is a single idempotent reconciliation loop:
//! - Every candidate item is visited once, in library order
//! - Its `trailers/` folder is converged to the provider's current URL
//! - Failures are contained to the item that caused them
//!
//! # Modules
//!
//! - `trailers`: Folder layout and the reconciler
//! - `library`: Library capability trait and the JSON manifest library
//! - `core`: Scheduled task wrapper and daily schedule
//! - `domain`: Data structures (LibraryItem, ReconcileReport, TaskInfo)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate trailers once
//! trailer-sync run --manifest library.json --force
//!
//! # Run every day at the configured time
//! trailer-sync daemon
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;
pub mod trailers;

// Re-export main types at crate root for convenience
pub use crate::core::{DailySchedule, GenerateTrailersTask};
pub use domain::{ItemOutcome, LibraryItem, ReconcileReport, RunOutcome, TaskInfo, TaskTrigger};
pub use library::{ItemQuery, Library, ManifestLibrary};
pub use trailers::{ProgressSink, TrailerConfig, TrailerError, TrailerReconciler};

// Cancellation signal accepted by the task and reconciler
pub use tokio_util::sync::CancellationToken;
