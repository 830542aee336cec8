//! Error type shared by every fallible operation in the crate.
//!
//! Configuration lookups never fail (they warn and fall back, see
//! [`crate::config`]); what remains here is construction-time misconfiguration
//! and I/O on the run output.

use thiserror::Error;

/// Errors raised while building the detection pipeline or writing a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("table '{name}' needs at least 2 points, got {got}")]
    InsufficientPoints { name: String, got: usize },

    #[error("table '{name}': energies must be strictly increasing (index {index})")]
    NotAscending { name: String, index: usize },

    #[error("table '{name}': energy and value columns differ in length ({energies} vs {values})")]
    LengthMismatch {
        name: String,
        energies: usize,
        values: usize,
    },

    #[error("invalid value for '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("unknown optical table '{0}'")]
    UnknownTable(String),

    #[error("unknown particle species '{0}'")]
    UnknownParticle(String),

    #[error("malformed {what} at line {line}: {reason}")]
    Parse {
        what: &'static str,
        line: usize,
        reason: String,
    },

    #[error("run output already finalized")]
    OutputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
