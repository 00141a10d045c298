//! Error types for the crossfade engine

use std::fmt;
use thiserror::Error;

/// Result type for crossfade operations
pub type Result<T> = std::result::Result<T, CrossfadeError>;

/// Which side of the transition a signal plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalRole {
    /// Signal A, whose tail fades out
    Outgoing,
    /// Signal B, whose head fades in
    Incoming,
}

impl fmt::Display for SignalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalRole::Outgoing => write!(f, "outgoing"),
            SignalRole::Incoming => write!(f, "incoming"),
        }
    }
}

/// Errors that can occur while building or running a crossfade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrossfadeError {
    /// A parameter is out of range, or the two signals are incompatible
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A signal is shorter than the requested transition
    #[error("Insufficient length: {role} signal has {available} frames, transition needs {required}")]
    InsufficientLength {
        role: SignalRole,
        required: usize,
        available: usize,
    },
}

impl CrossfadeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}
