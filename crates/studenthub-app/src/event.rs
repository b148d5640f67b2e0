//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from one source: sync client notifications translated by
//! the [`crate::Bridge`]. User interactions enter through the App's intent
//! methods instead, mirroring how the host UI calls in.

use studenthub_core::{Applied, CounterSnapshot, LogEntry, PeerPresence};

use crate::ConnectionBanner;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Connection banner changed.
    ConnectionChanged(ConnectionBanner),

    /// Notification badges changed.
    BadgesChanged(CounterSnapshot),

    /// Presence of the active chat peer changed.
    PresenceChanged(PeerPresence),

    /// Authoritative history replaced the conversation.
    HistoryLoaded(Vec<LogEntry>),

    /// An optimistic entry was appended to the conversation.
    MessageQueued(LogEntry),

    /// A confirmed message was reconciled into the conversation.
    MessageDelivered {
        /// The confirmed entry.
        entry: LogEntry,
        /// Whether it replaced an optimistic line or appended.
        applied: Applied,
    },

    /// A user-visible error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
