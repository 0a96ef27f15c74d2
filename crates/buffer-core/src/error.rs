//! Error types for hybrid buffer storage backends

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the storage Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for storage backends
#[derive(Error, Debug)]
pub enum Error {
    // Precondition errors
    #[error("No file created yet")]
    NotCreated,

    // Storage errors
    #[error("Storage path not found: {}", path.display())]
    StoragePathNotFound { path: PathBuf },

    #[error("Failed to {operation} {}: {source}", path.display())]
    Storage {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Wrap an I/O failure on `path`, mapping `NotFound` to [`Error::StoragePathNotFound`].
    pub fn storage(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::StoragePathNotFound { path }
        } else {
            Error::Storage {
                operation,
                path,
                source,
            }
        }
    }

    /// Returns true if the targeted file does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::StoragePathNotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns true if an operation was called before its required predecessor
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::NotCreated)
    }

    /// The underlying I/O error kind, if this error came from the file system
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::StoragePathNotFound { .. } => Some(io::ErrorKind::NotFound),
            Error::Storage { source, .. } => Some(source.kind()),
            Error::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
