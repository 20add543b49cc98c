use std::path::PathBuf;

use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid record input: {0}")]
    InvalidRecord(String),

    #[error("failed to write report `{path}`: {detail}")]
    Write { path: PathBuf, detail: String },
}

impl FsError {
    #[must_use]
    pub fn from_write_failure(path: PathBuf, source: &std::io::Error) -> Self {
        Self::Write {
            path,
            detail: source.to_string(),
        }
    }

    /// Stable, unique, machine-readable error code for every variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "FS-IO",
            Self::Json(_) => "FS-JSON",
            Self::InvalidRecord(_) => "FS-INVALID-RECORD",
            Self::Write { .. } => "FS-WRITE",
        }
    }
}
