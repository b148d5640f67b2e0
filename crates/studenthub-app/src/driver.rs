//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each host implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use studenthub_client::ClientEvent;

use crate::{App, AppAction, IoCommand};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures the
/// same orchestration code runs against a live backend and in deterministic
/// tests.
///
/// # Implementations
///
/// - **Native**: WebSocket transport plus the REST client
/// - **Test**: scripted inputs and captured commands, with virtual time
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): platform-specific error type
/// - [`Instant`](Driver::Instant): time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in tests.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for actions derived from user input.
    ///
    /// The driver translates raw input (clicks, route changes) into App
    /// intent calls and returns the resulting actions, or an empty vec when
    /// no input is ready.
    fn poll_actions(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Execute one I/O command from the bridge.
    ///
    /// Completions arrive later through [`Driver::recv_update`].
    ///
    /// # Errors
    ///
    /// Returns an error only for driver failures; backend failures are fed
    /// back as events (for example `RoomResolveFailed`).
    fn execute(
        &mut self,
        command: IoCommand,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next sync client event: a transport callback, a server
    /// event, or a REST completion.
    ///
    /// Returns `None` if nothing is ready.
    fn recv_update(
        &mut self,
    ) -> impl Future<Output = Option<ClientEvent<Self::Instant>>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop connections and clean up resources.
    fn stop(&mut self);
}
