//! Domain types for trailer generation.
//!
//! This module contains the core data structures:
//! - Item: Library items and their provider metadata
//! - Run: Per-item outcomes and run reports
//! - Task: Scheduled task identity and triggers

pub mod item;
pub mod run;
pub mod task;

// Re-export commonly used types
pub use item::{ItemKind, LibraryItem, MediaType, RemoteTrailer};
pub use run::{ItemOutcome, ReconcileReport, RunOutcome};
pub use task::{TaskInfo, TaskTrigger};
