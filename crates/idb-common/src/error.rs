//! Error types for the item database workspace.
//!
//! Only failures a caller can act on become errors: a missing requested
//! file, unrecoverable I/O, or a save that cannot be carried out. Decode
//! failures, shape mismatches, and field coercion failures degrade to
//! [`Diagnostic`](crate::Diagnostic) entries instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for item database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// File system access errors.
    Io,
    /// Record serialization errors.
    Serialize,
    /// Text encoding errors.
    Encoding,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Serialize => write!(f, "serialize"),
            ErrorCategory::Encoding => write!(f, "encoding"),
        }
    }
}

/// Unified error type for the loader and writer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no encoder available for {0}")]
    UnsupportedSaveEncoding(&'static str),
}

impl Error {
    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::FileNotFound { .. } | Error::Io(_) => ErrorCategory::Io,
            Error::Yaml(_) | Error::Json(_) => ErrorCategory::Serialize,
            Error::UnsupportedSaveEncoding(_) => ErrorCategory::Encoding,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Recoverable errors may be resolved by retrying, fixing the path,
    /// or picking a different target encoding.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::FileNotFound { .. } => true,
            Error::Io(_) => true,
            Error::Yaml(_) | Error::Json(_) => false,
            // Pick UTF-8, UTF-16, GB18030, or Big5 instead
            Error::UnsupportedSaveEncoding(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_category() {
        let err = Error::FileNotFound {
            path: Path::new("/tmp/missing.yml").to_path_buf(),
        };
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(
            Error::UnsupportedSaveEncoding("UTF-7").category(),
            ErrorCategory::Encoding
        );
    }

    #[test]
    fn test_file_not_found_display() {
        let err = Error::FileNotFound {
            path: Path::new("/data/item_db.yml").to_path_buf(),
        };
        assert_eq!(err.to_string(), "file not found: /data/item_db.yml");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Io.to_string(), "io");
        assert_eq!(ErrorCategory::Serialize.to_string(), "serialize");
    }
}
