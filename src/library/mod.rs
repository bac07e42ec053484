//! Library access for trailer generation.
//!
//! The media library and its metadata provider are external collaborators.
//! Everything the reconciler needs from them goes through the [`Library`]
//! trait: one query for candidate items, one lookup for an item's trailer URL.
//!
//! # Manifest Layout
//!
//! ```text
//! library.json                    # { "version": 1, "items": [...] }
//! movies/
//! └── Inception (2010)/           # containing_folder of an item
//!     ├── Inception.mkv
//!     └── trailers/
//!         ├── .ignore             # optional, disables management
//!         └── Inception-Trailer.strm
//! ```

pub mod manifest;

use anyhow::Result;

use crate::domain::{ItemKind, LibraryItem, MediaType};

pub use manifest::{Manifest, ManifestLibrary};

/// Capabilities the reconciler needs from the host library
pub trait Library: Send + Sync {
    /// Items matching `query`, in library order
    fn candidate_items(&self, query: &ItemQuery) -> Result<Vec<LibraryItem>>;

    /// The provider's trailer URL for `item`, if it has one
    fn resolve_trailer_url(&self, item: &LibraryItem) -> Result<Option<String>>;
}

/// Filter for candidate items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Accepted media types (empty accepts all)
    pub media_types: Vec<MediaType>,

    /// Accepted item kinds (empty accepts all)
    pub include_item_kinds: Vec<ItemKind>,

    /// Item must carry an identifier from at least one of these providers
    /// (empty accepts all)
    pub has_any_provider_id: Vec<String>,
}

impl ItemQuery {
    /// Video movies matched by `provider`
    pub fn for_provider(provider: impl Into<String>) -> Self {
        Self {
            media_types: vec![MediaType::Video],
            include_item_kinds: vec![ItemKind::Movie],
            has_any_provider_id: vec![provider.into()],
        }
    }

    /// Check whether an item satisfies every clause of the query
    pub fn matches(&self, item: &LibraryItem) -> bool {
        let media_ok = self.media_types.is_empty() || self.media_types.contains(&item.media_type);
        let kind_ok =
            self.include_item_kinds.is_empty() || self.include_item_kinds.contains(&item.kind);
        let provider_ok = self.has_any_provider_id.is_empty()
            || self
                .has_any_provider_id
                .iter()
                .any(|p| item.has_provider_id(p));

        media_ok && kind_ok && provider_ok
    }
}

/// First non-blank URL among an item's remote trailers
pub fn first_trailer_url(item: &LibraryItem) -> Option<String> {
    item.remote_trailers
        .iter()
        .map(|t| t.url.trim())
        .find(|url| !url.is_empty())
        .map(str::to_string)
}
