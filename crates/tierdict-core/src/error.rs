//! Error types for the tiering job.

use std::path::PathBuf;

/// Tiering errors.
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    /// Reading or writing a file failed.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source table could not be decoded.
    #[error("invalid source table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON encode/decode failure.
    #[error("json error: {message}")]
    Json { message: String },

    /// Manifest document does not have the expected shape.
    #[error("invalid manifest {}: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    /// Tier plan is unusable.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl TierError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Csv { .. } => 4,
            Self::Json { .. } => 4,
            Self::Manifest { .. } => 4,
        }
    }
}

impl From<serde_json::Error> for TierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// Result type for tiering operations.
pub type TierResult<T> = Result<T, TierError>;
