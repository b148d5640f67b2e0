//! Sync client errors.

use thiserror::Error;

/// Errors returned by [`crate::SyncClient::handle`].
///
/// These indicate caller bugs (events fed outside a session) rather than
/// runtime failures; runtime failures surface as `SurfaceError` actions and
/// degrade a single view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// An event requiring a session arrived while logged out.
    #[error("no active session for {operation}")]
    NoSession {
        /// Operation that required a session.
        operation: &'static str,
    },
}
