//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use studenthub_core::{CounterKind, Session};
use studenthub_proto::UserId;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Render the view.
    Render,

    /// Shut the host down.
    Quit,

    /// Start a session for an authenticated user.
    Login(Session),

    /// End the session.
    Logout,

    /// Open a conversation with a peer.
    OpenChat {
        /// Peer to chat with.
        peer_id: UserId,
    },

    /// Close the open conversation.
    CloseChat,

    /// Send a message in the open conversation.
    SendMessage {
        /// Message text.
        content: String,
    },

    /// Open the view that consumes a notification badge.
    OpenView {
        /// Which badge the view consumes.
        kind: CounterKind,
    },
}
