use thiserror::Error;

/// State synchronizer failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("delta from_version {expected} does not match snapshot version {actual}")]
    VersionMismatch { expected: u64, actual: u64 },
    #[error("snapshot hash mismatch: recomputed {recomputed}, stored {stored}")]
    HashMismatch { recomputed: String, stored: String },
    #[error("snapshot failed structural validation: {0}")]
    InvalidSnapshot(&'static str),
    #[error("client state unrecoverable: {0}")]
    Unrecoverable(&'static str),
    #[error("unknown path segment in delta: {0}")]
    UnknownPath(String),
}
