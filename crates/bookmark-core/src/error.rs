//! Error handling
//!
//! Typed errors for repository, import and export operations, with
//! descriptive messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in bookmark operations
#[derive(Error, Debug)]
pub enum Error {
    /// No bookmark with the given ID
    #[error("Bookmark not found: {0}")]
    NotFound(i64),

    /// Input rejected before touching storage (empty url, malformed filter)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// SQLite database error
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// File could be read but not imported
    #[error("Failed to import '{path}': {details}")]
    ImportParse { path: PathBuf, details: String },

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an error from an I/O error raised while reading `path`
    pub fn reading(error: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match classify(&error) {
            Some(kind) => kind.into_error(error, path),
            None => Error::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Create an error from an I/O error raised while writing `path`
    pub fn writing(error: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match classify(&error) {
            Some(kind) => kind.into_error(error, path),
            None => Error::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::DiskFull { .. } => Some("Free up disk space and try again."),
            Error::PermissionDenied { .. } => Some(
                "Check file and directory permissions. You may need to run with different permissions or change ownership.",
            ),
            Error::FileNotFound { .. } => Some("Check the path and try again."),
            Error::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            Error::NotFound(_) => Some("Use `bookmarks list` to see existing bookmark IDs."),
            _ => None,
        }
    }
}

/// I/O failure classes that get their own variant
enum IoClass {
    PermissionDenied,
    NotFound,
    DiskFull,
}

impl IoClass {
    fn into_error(self, source: io::Error, path: PathBuf) -> Error {
        match self {
            IoClass::PermissionDenied => Error::PermissionDenied { path, source },
            IoClass::NotFound => Error::FileNotFound { path },
            IoClass::DiskFull => Error::DiskFull { path, source },
        }
    }
}

fn classify(error: &io::Error) -> Option<IoClass> {
    match error.kind() {
        io::ErrorKind::PermissionDenied => Some(IoClass::PermissionDenied),
        io::ErrorKind::NotFound => Some(IoClass::NotFound),
        _ if is_disk_full_error(error) => Some(IoClass::DiskFull),
        _ => None,
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for bookmark operations
pub type Result<T> = std::result::Result<T, Error>;
