//! Error types for scraperkit-archive.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or reading an archive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source directory does not exist or is not a directory.
    #[error("build directory not found: {}", path.display())]
    BuildDirNotFound { path: PathBuf },

    /// The illustration is missing from the source directory.
    #[error("illustration not found: {}", path.display())]
    IllustrationNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A redirects file line does not have the expected shape.
    #[error("malformed redirect at line {line}: {content:?}")]
    RedirectFormat { line: usize, content: String },

    /// A redirect points to an entry that was never added.
    #[error("redirect {alias} points to unknown entry {target}")]
    RedirectTarget { alias: String, target: String },

    /// Two entries share the same path.
    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    /// The path is one the creator writes itself.
    #[error("reserved entry path: {0}")]
    ReservedPath(String),

    /// The archive has no entry at that path.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// The file is not an archive this crate can read.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Container-level failure.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Manifest (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory walk failure.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Whether this is an I/O-kind error (including missing prerequisites).
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::BuildDirNotFound { .. } | Self::IllustrationNotFound { .. } | Self::Io(_)
        )
    }

    /// Whether this error comes from an unusable redirects file.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectFormat { .. } | Self::RedirectTarget { .. })
    }
}
