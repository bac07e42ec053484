//! On-disk trailer layout.
//!
//! ```text
//! <item folder>/
//! └── trailers/
//!     ├── .ignore                  # leave this folder alone
//!     └── <FirstWord>-Trailer.strm # content: the trailer URL
//! ```

use std::path::{Path, PathBuf};

use glob::Pattern;

use super::TrailerError;

/// Name of the trailers subfolder
pub const TRAILERS_FOLDER: &str = "trailers";

/// Suffix shared by every generated trailer file
pub const TRAILER_FILE_SUFFIX: &str = "-Trailer.strm";

/// Marker file that disables management of a trailers folder
pub const IGNORE_MARKER: &str = ".ignore";

/// Trailers folder for an item folder
pub fn trailers_folder(containing_folder: &Path) -> PathBuf {
    containing_folder.join(TRAILERS_FOLDER)
}

/// Whether the trailers folder carries an ignore marker
pub fn is_ignored(trailers_folder: &Path) -> bool {
    trailers_folder.join(IGNORE_MARKER).is_file()
}

/// First whitespace-delimited token of an item name
pub fn first_token(name: &str) -> Result<&str, TrailerError> {
    name.split_whitespace()
        .next()
        .ok_or_else(|| TrailerError::EmptyItemName(name.to_string()))
}

/// File name of the trailer artifact for an item name
pub fn artifact_file_name(item_name: &str) -> Result<String, TrailerError> {
    Ok(format!("{}{}", first_token(item_name)?, TRAILER_FILE_SUFFIX))
}

/// Full artifact path inside a trailers folder
pub fn artifact_path(trailers_folder: &Path, item_name: &str) -> Result<PathBuf, TrailerError> {
    Ok(trailers_folder.join(artifact_file_name(item_name)?))
}

/// Glob matching generated trailer file names
pub const TRAILER_SEARCH_PATTERN: &str = "*-Trailer.strm";

/// Whether a file name looks like a generated trailer
pub fn is_trailer_file_name(file_name: &str) -> bool {
    Pattern::new(TRAILER_SEARCH_PATTERN)
        .map(|pattern| pattern.matches(file_name))
        .unwrap_or(false)
}
