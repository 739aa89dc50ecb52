use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Errors raised while loading data, fitting models or cross-validating.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to read dataset {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unpickle dataset {path}")]
    Pickle {
        path: PathBuf,
        #[source]
        source: serde_pickle::Error,
    },

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("cannot split {samples} samples into {partitions} partitions (need 2 <= partitions <= samples)")]
    InvalidPartitions { partitions: usize, samples: usize },

    #[error("iteration count must be at least 1")]
    InvalidIterations,

    #[error("unsupported classification method '{0}' (expected one of: svm, random_forest)")]
    UnsupportedMethod(String),

    #[error("{0} model used before being fitted")]
    NotFitted(&'static str),

    #[error("failed to fit {model}: {reason}")]
    Fit { model: &'static str, reason: String },
}

impl ClassifyError {
    /// The underlying I/O error kind, if this error came from the filesystem.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            ClassifyError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
