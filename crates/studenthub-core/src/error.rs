//! Error types for the sync core primitives.
//!
//! Strongly typed instead of stringly typed so callers can distinguish
//! transient conditions (worth retrying) from logic errors. Nothing here is
//! fatal to the process; every failure degrades a single view or feature.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors from the connection lifecycle state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid state transition attempted.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred.
        state: ConnectionState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// The reconnect attempt cap was reached.
    #[error("reconnect attempts exhausted after {attempts}")]
    RetriesExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl ConnectionError {
    /// Returns true if the condition may clear on its own.
    ///
    /// Invalid transitions indicate a caller bug and are never transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_errors_are_not_transient() {
        let err = ConnectionError::InvalidState {
            state: ConnectionState::Idle,
            operation: "established",
        };
        assert!(!err.is_transient());
        assert!(ConnectionError::RetriesExhausted { attempts: 5 }.is_transient());
    }
}
