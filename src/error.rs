//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Covers executable lookup, option validation, process spawning and renderer
//! exit-code failures.
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("renderer executable not found: {}", path.display())]
    ExecutableNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("render failed (exit code {code}): {message}")]
    RenderFailed { code: i32, message: String },

    #[error("renderer did not finish within {after:?} and was killed")]
    TimedOut { after: Duration },

    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid job description: {0}")]
    Job(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        Error::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Exit code reported by the renderer, if this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::RenderFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}
