//! Error types for perfilar.

use std::path::PathBuf;

/// Result type alias for perfilar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in perfilar operations.
///
/// Loader problems (`Io`, `Arrow`, `Parquet`) are raised before any
/// profiling starts. `Schema` covers structural violations of the table
/// invariant (duplicate column names, ragged columns). Content degeneracies
/// such as empty tables or all-null columns are never errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data loading or conversion.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error during file operations.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Structural violation of the table invariant.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of the structural violation.
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Unsupported file format.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// The unsupported format name or extension.
        format: String,
    },

    /// Serialization error (JSON output, report rendering).
    #[error("Format error: {0}")]
    Format(String),

    /// HTTP server error.
    #[error("Server error: {message}")]
    Serve {
        /// Description of the server error.
        message: String,
    },
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an I/O error without path context.
    pub fn io_no_path(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a server error.
    pub fn serve(message: impl Into<String>) -> Self {
        Self::Serve {
            message: message.into(),
        }
    }
}
