//! Observable application state types.
//!
//! This module defines the data structures that represent the application's
//! current view of the world, such as [`ChatView`] and [`ConnectionBanner`].
//!
//! These structures serve as the view model for the host UI. They contain the
//! subset of sync state necessary for rendering without exposing the
//! reconciliation mechanics of the underlying client.

use studenthub_core::{LogEntry, PeerPresence};
use studenthub_proto::{Message, UserId};

/// Connection banner shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionBanner {
    /// No session; nothing to connect.
    Offline,
    /// First connect in progress.
    Connecting,
    /// Live; realtime updates flowing.
    Live,
    /// Connection dropped; reconnect pending.
    Reconnecting,
    /// Reconnects exhausted; live updates unavailable until re-login.
    Unavailable,
}

/// One rendered line of the active conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// The message.
    pub message: Message,
    /// Still awaiting server confirmation.
    pub pending: bool,
}

impl ChatLine {
    /// Build a line from a sync log entry.
    pub fn from_entry(entry: LogEntry) -> Self {
        let pending = entry.status == studenthub_core::DeliveryStatus::Optimistic;
        Self { message: entry.message, pending }
    }
}

/// State of the open chat view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    /// Peer on the other side of the conversation.
    pub peer_id: UserId,
    /// Conversation lines in display order.
    pub lines: Vec<ChatLine>,
    /// Presence of the peer.
    pub presence: PeerPresence,
    /// History fetch still in flight.
    pub loading: bool,
}

impl ChatView {
    /// Fresh view for a peer, awaiting history.
    pub fn new(peer_id: UserId) -> Self {
        Self { peer_id, lines: Vec::new(), presence: PeerPresence::default(), loading: true }
    }
}
