//! Trailer strm generation.
//!
//! For every candidate item the reconciler converges `<item>/trailers/`
//! towards the provider's current trailer URL:
//!
//! 1. **Ignore**: a `.ignore` marker freezes the folder
//! 2. **Prune**: no URL means stale `*-Trailer.strm` files (and an empty
//!    folder) are removed
//! 3. **Write**: a URL is written to `<FirstWord>-Trailer.strm` when the
//!    file is missing or older than the item's last save

pub mod layout;
pub mod reconciler;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use layout::{artifact_path, trailers_folder, IGNORE_MARKER, TRAILERS_FOLDER, TRAILER_FILE_SUFFIX};
pub use reconciler::TrailerReconciler;

/// Provider name used when none is configured
pub const DEFAULT_PROVIDER: &str = "MetaTube";

/// Errors raised while reconciling a single item
#[derive(Debug, Error)]
pub enum TrailerError {
    #[error("Item name has no usable first word: {0:?}")]
    EmptyItemName(String),

    #[error("Trailer lookup failed: {0:#}")]
    Lookup(anyhow::Error),

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrailerError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Settings the reconciler reads at the start of each run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerConfig {
    /// Master switch for the whole feature
    pub enable_trailers: bool,

    /// Provider whose identifiers mark candidate items
    pub provider_name: String,
}

impl Default for TrailerConfig {
    fn default() -> Self {
        Self {
            enable_trailers: false,
            provider_name: DEFAULT_PROVIDER.to_string(),
        }
    }
}

impl TrailerConfig {
    /// Enabled configuration for a provider
    pub fn enabled(provider_name: impl Into<String>) -> Self {
        Self {
            enable_trailers: true,
            provider_name: provider_name.into(),
        }
    }
}

/// Receives run progress as a percentage in `0.0..=100.0`
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}
