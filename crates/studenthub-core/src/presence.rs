//! Peer presence for the active chat view.

/// Online/typing flags for the peer currently open in the chat view.
///
/// Valid only while that view is open; cleared when the view changes or the
/// connection drops. Presence for any other peer is never tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerPresence {
    /// Peer has an active realtime connection.
    pub is_online: bool,
    /// Peer is typing in the shared room.
    pub is_typing: bool,
}

impl PeerPresence {
    /// Clear both flags.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
