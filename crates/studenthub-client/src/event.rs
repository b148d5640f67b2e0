//! Sync client events and actions.

use studenthub_core::{Applied, CounterKind, CounterSnapshot, LogEntry, PeerPresence, Session};
use studenthub_proto::{ClientDirective, Message, RoomId, ServerEvent, UserId};

/// Events the caller feeds into the sync client.
///
/// The caller is responsible for:
/// - Driving the session lifecycle (login, logout)
/// - Relaying transport callbacks (connected, closed, server events)
/// - Executing REST actions and feeding their results back
/// - Forwarding user intents (open chat, send message)
/// - Driving time forward via ticks
///
/// Generic over `I` (instant type) to support both production
/// (`std::time::Instant`) and virtual-time test environments.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// A user logged in; the session owns the realtime connection.
    SessionStarted {
        /// The authenticated principal.
        session: Session,
    },

    /// The user logged out or the owning view unmounted.
    SessionEnded,

    /// The transport finished connecting and authenticating.
    TransportConnected,

    /// The transport dropped without an intentional close.
    TransportClosed {
        /// Transport-reported reason.
        reason: String,
    },

    /// A server event arrived over the realtime channel.
    EventReceived(ServerEvent),

    /// The user opened a chat view with a peer.
    OpenChat {
        /// Peer on the other side of the conversation.
        peer_id: UserId,
    },

    /// The backend resolved (or created) the room for a peer pair.
    RoomResolved {
        /// Peer the resolution was requested for.
        peer_id: UserId,
        /// The resolved room.
        room_id: RoomId,
    },

    /// Room resolution failed; message loading for the view is aborted.
    RoomResolveFailed {
        /// Peer the resolution was requested for.
        peer_id: UserId,
        /// Backend-reported reason.
        reason: String,
    },

    /// Authoritative message history arrived for a room.
    HistoryLoaded {
        /// Room the history belongs to.
        room_id: RoomId,
        /// Messages in chronological order.
        messages: Vec<Message>,
    },

    /// History fetch failed for a room.
    HistoryLoadFailed {
        /// Room the fetch was for.
        room_id: RoomId,
        /// Backend-reported reason.
        reason: String,
    },

    /// The two counter seed fetches completed.
    SeedsLoaded {
        /// Pending connection requests (list length).
        requests: u64,
        /// Unread chat messages.
        unread_chat: u64,
    },

    /// The user submitted a message in the active chat view.
    SendMessage {
        /// Message text.
        content: String,
    },

    /// The user opened the view that consumes a counter.
    ViewOpened {
        /// Which counter the view consumes.
        kind: CounterKind,
    },

    /// The user navigated away from the chat view.
    CloseChat,

    /// Time tick for reconnect processing.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Actions the sync client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Open the realtime transport, presenting the session token.
    Connect {
        /// Bearer token for transport authentication.
        token: String,
    },

    /// Close the realtime transport.
    Disconnect,

    /// Emit a directive over the open transport.
    Emit(ClientDirective),

    /// Resolve (or create) the room for a peer pair via the backend.
    ///
    /// The caller feeds the result back as `RoomResolved` or
    /// `RoomResolveFailed`.
    ResolveRoom {
        /// Peer to resolve a room for.
        peer_id: UserId,
    },

    /// Fetch message history for a room.
    ///
    /// The caller feeds the result back as `HistoryLoaded` or
    /// `HistoryLoadFailed`.
    FetchHistory {
        /// Room to fetch history for.
        room_id: RoomId,
    },

    /// Run the two counter seed fetches.
    ///
    /// The caller feeds the result back as `SeedsLoaded`. The two fetches
    /// are commutative; they may resolve in either order.
    FetchSeeds,

    /// An optimistic entry was appended to the active log.
    MessageQueued(LogEntry),

    /// A confirmed message was reconciled into the active log.
    MessageDelivered {
        /// The confirmed entry.
        entry: LogEntry,
        /// Whether it replaced an optimistic entry or appended.
        applied: Applied,
    },

    /// The active log was replaced by authoritative history.
    HistoryReplaced(Vec<LogEntry>),

    /// Notification counters changed.
    CountersChanged(CounterSnapshot),

    /// Presence of the active chat peer changed (or was cleared).
    PresenceChanged(PeerPresence),

    /// Surface a user-visible error for the current view.
    SurfaceError {
        /// Human-readable description.
        message: String,
    },

    /// Log message for debugging.
    Log {
        /// Log message.
        message: String,
    },
}
