use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// raise/clear called with an empty key
    #[error("key is required when {operation} a change")]
    InvalidKey { operation: &'static str },

    /// Second activation on the same page instance
    #[error("only one activation is allowed per page")]
    AlreadyActivated,

    /// Activation attempted without the field-change event source
    #[error("activation requires a missing dependency: {dependency}")]
    MissingDependency { dependency: &'static str },
}

/// Error category, matchable from scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidKey,
    AlreadyActivated,
    MissingDependency,
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::InvalidKey { .. } => ErrorKind::InvalidKey,
            TrackerError::AlreadyActivated => ErrorKind::AlreadyActivated,
            TrackerError::MissingDependency { .. } => ErrorKind::MissingDependency,
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
