use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering dependencies on disk or setting up lookups.
///
/// [`AuditError::ScanRoot`], [`AuditError::Client`] and [`AuditError::ScanTask`]
/// abort a run; the file variants are logged and the offending file is skipped.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("cannot scan {}: {source}", path.display())]
    ScanRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("scan task failed: {0}")]
    ScanTask(#[from] tokio::task::JoinError),
}

/// Per-package registry failures. Each maps to exactly one status.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("registry answered {0}")]
    Status(reqwest::StatusCode),

    /// The registry answered but has no usable entry for the package.
    #[error("{0}")]
    Missing(String),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}
