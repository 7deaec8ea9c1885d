//! Engine errors
//!
//! Every variant is a configuration or programming error. Nothing here is
//! transient: callers are expected to abort the run and report the message,
//! since continuing would break grain conservation silently.

use thiserror::Error;

/// Engine result type
pub type Result<T> = std::result::Result<T, SandpileError>;

#[derive(Debug, Error)]
pub enum SandpileError {
    /// Undefined or unsupported rule / boundary / value kind reached a dispatch point.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Coordinates out of range, wrong grid shape, neighbour-count mismatch, ...
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The operation needs a grid (or toppling) that this pile never built.
    #[error("resource missing: {0}")]
    ResourceMissing(&'static str),

    #[error("invalid configuration json: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SandpileError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SandpileError::Configuration(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        SandpileError::InvariantViolation(msg.into())
    }
}
