//! Library items as handed over by the library collaborator.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A media item in the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Display name (first word names the trailer file)
    pub name: String,

    /// Folder holding the media file(s)
    pub containing_folder: PathBuf,

    /// When the item's metadata was last saved, in its original offset
    pub date_last_saved: DateTime<FixedOffset>,

    /// Kind of item
    #[serde(default)]
    pub kind: ItemKind,

    /// Media type of the item
    #[serde(default)]
    pub media_type: MediaType,

    /// Provider identifiers (provider name -> id)
    #[serde(default)]
    pub provider_ids: HashMap<String, String>,

    /// Remote trailers supplied by the metadata provider, in provider order
    #[serde(default)]
    pub remote_trailers: Vec<RemoteTrailer>,
}

impl LibraryItem {
    /// Create a video movie item saved at the given instant
    pub fn new(
        name: impl Into<String>,
        containing_folder: impl Into<PathBuf>,
        date_last_saved: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            containing_folder: containing_folder.into(),
            date_last_saved: date_last_saved.fixed_offset(),
            kind: ItemKind::Movie,
            media_type: MediaType::Video,
            provider_ids: HashMap::new(),
            remote_trailers: Vec::new(),
        }
    }

    /// Tag the item with a provider identifier
    pub fn with_provider_id(mut self, provider: impl Into<String>, id: impl Into<String>) -> Self {
        self.provider_ids.insert(provider.into(), id.into());
        self
    }

    /// Attach a remote trailer URL
    pub fn with_trailer(mut self, url: impl Into<String>) -> Self {
        self.remote_trailers.push(RemoteTrailer {
            url: url.into(),
            name: None,
        });
        self
    }

    /// Set the item kind
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the media type
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Last-saved time as a UTC instant
    pub fn last_saved_utc(&self) -> DateTime<Utc> {
        self.date_last_saved.with_timezone(&Utc)
    }

    /// Whether the item carries an identifier from `provider`
    pub fn has_provider_id(&self, provider: &str) -> bool {
        self.provider_ids.contains_key(provider)
    }
}

/// A trailer URL published by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTrailer {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Kind of library item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Movie,
    Series,
    Episode,
    Other,
}

/// Media type of a library item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Video,
    Audio,
    Other,
}
