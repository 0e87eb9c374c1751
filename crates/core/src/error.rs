//! Error types for grid construction, analysis configuration and file I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the cloud analysis core.
///
/// Every variant is a precondition failure detected before a parallel pass is
/// launched. Once a pass has started nothing can fail: tasks do no I/O and an
/// index-range underflow is a programming error that panics instead.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Grid dimensions overflow, are negative, or disagree with field lengths.
    #[error("invalid grid dimensions: {reason}")]
    InvalidDimensions {
        /// What was wrong with the dimensions
        reason: String,
    },

    /// The grid holds no points, so the prevailing wind is undefined.
    #[error("grid is empty: prevailing wind is undefined")]
    EmptyGrid,

    /// An analysis parameter is out of range.
    #[error("invalid analysis config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Description of the constraint
        reason: String,
    },

    /// The dedicated worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// Reading or writing a grid file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A token in a grid or reference file could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending token
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// The file ended before all values announced by its header were read.
    #[error("file truncated: expected {expected} values, found {found}")]
    Truncated {
        /// Number of values required by the header
        expected: usize,
        /// Number of values actually present
        found: usize,
    },
}

impl CloudError {
    pub(crate) fn invalid_dimensions(reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CloudError>;
