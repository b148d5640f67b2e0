//! Sync client state machine.
//!
//! The `SyncClient` is the top-level state machine for one logged-in
//! session. It owns the connection lifecycle, the single active room
//! membership, the conversation log, and the derived notification/presence
//! state, and it reconciles inbound server events against optimistic local
//! writes.
//!
//! Events are applied strictly in the order they are handed in; nothing is
//! reordered or coalesced. Events that arrive while the connection is not
//! live (or after logout) are dropped, never buffered.

use studenthub_core::{
    Connection, ConnectionAction, ConnectionState, CounterKind, MessageLog, NotificationCounters,
    PeerPresence, ReconnectPolicy, Session, env::Environment,
};
use studenthub_proto::{ClientDirective, Message, RoomId, ServerEvent, UserId};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent},
};

/// The active chat view's room membership.
///
/// At most one membership exists at a time; switching conversations leaves
/// the prior room first.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatContext {
    /// No chat view open.
    Idle,
    /// Room resolution in flight for a peer.
    Resolving { peer_id: UserId },
    /// Joined; events for this room flow into the log.
    Active { peer_id: UserId, room_id: RoomId },
}

/// Sync client for one session.
pub struct SyncClient<E: Environment> {
    /// Environment for time and randomness.
    env: E,

    /// Logged-in principal. `None` between logout and the next login.
    session: Option<Session>,

    /// Realtime connection lifecycle.
    connection: Connection<E::Instant>,

    /// Active chat view membership.
    chat: ChatContext,

    /// Message log for the active conversation.
    log: MessageLog,

    /// Notification counters (chat, requests, posts).
    counters: NotificationCounters,

    /// Presence of the active chat peer.
    presence: PeerPresence,
}

impl<E: Environment> SyncClient<E> {
    /// Create a new client with the default reconnect policy.
    pub fn new(env: E) -> Self {
        Self::with_policy(env, ReconnectPolicy::default())
    }

    /// Create a new client with an explicit reconnect policy.
    pub fn with_policy(env: E, policy: ReconnectPolicy) -> Self {
        Self {
            env,
            session: None,
            connection: Connection::new(policy),
            chat: ChatContext::Idle,
            log: MessageLog::new(),
            counters: NotificationCounters::new(),
            presence: PeerPresence::default(),
        }
    }

    /// The logged-in principal, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Room of the active chat view, once resolved.
    pub fn active_room(&self) -> Option<&RoomId> {
        match &self.chat {
            ChatContext::Active { room_id, .. } => Some(room_id),
            _ => None,
        }
    }

    /// Peer of the active chat view.
    pub fn active_peer(&self) -> Option<&UserId> {
        match &self.chat {
            ChatContext::Resolving { peer_id } | ChatContext::Active { peer_id, .. } => {
                Some(peer_id)
            },
            ChatContext::Idle => None,
        }
    }

    /// Conversation log for the active view.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Notification counters.
    pub fn counters(&self) -> &NotificationCounters {
        &self.counters
    }

    /// Presence of the active chat peer.
    pub fn presence(&self) -> PeerPresence {
        self.presence
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::SessionStarted { session } => Ok(self.handle_session_started(session)),
            ClientEvent::SessionEnded => Ok(self.handle_session_ended()),
            ClientEvent::TransportConnected => Ok(self.handle_transport_connected()),
            ClientEvent::TransportClosed { reason } => Ok(self.handle_transport_closed(&reason)),
            ClientEvent::EventReceived(event) => Ok(self.handle_server_event(event)),
            ClientEvent::OpenChat { peer_id } => self.handle_open_chat(peer_id),
            ClientEvent::RoomResolved { peer_id, room_id } => {
                Ok(self.handle_room_resolved(peer_id, room_id))
            },
            ClientEvent::RoomResolveFailed { peer_id, reason } => {
                Ok(self.handle_room_resolve_failed(&peer_id, &reason))
            },
            ClientEvent::HistoryLoaded { room_id, messages } => {
                Ok(self.handle_history_loaded(&room_id, messages))
            },
            ClientEvent::HistoryLoadFailed { room_id, reason } => {
                Ok(self.handle_history_load_failed(&room_id, &reason))
            },
            ClientEvent::SeedsLoaded { requests, unread_chat } => {
                Ok(self.handle_seeds_loaded(requests, unread_chat))
            },
            ClientEvent::SendMessage { content } => self.handle_send_message(content),
            ClientEvent::ViewOpened { kind } => Ok(self.handle_view_opened(kind)),
            ClientEvent::CloseChat => Ok(self.handle_close_chat()),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
        }
    }

    fn handle_session_started(&mut self, session: Session) -> Vec<ClientAction> {
        // A new login discards everything derived from the previous session.
        self.reset_derived_state();
        let token = session.token.clone();
        let user_id = session.user_id.clone();
        self.session = Some(session);

        let mut actions = Vec::new();
        for action in self.connection.open() {
            match action {
                ConnectionAction::Close => actions.push(ClientAction::Disconnect),
                ConnectionAction::Connect => {
                    actions.push(ClientAction::Connect { token: token.clone() });
                },
                ConnectionAction::ScheduleRetry { .. } => {},
            }
        }
        actions.push(ClientAction::Log { message: format!("session started for {user_id}") });
        actions
    }

    fn handle_session_ended(&mut self) -> Vec<ClientAction> {
        if self.session.is_none() {
            return vec![];
        }

        // Close the connection before tearing down derived state so no
        // further events from it can be applied.
        let mut actions = Vec::new();
        for action in self.connection.close() {
            if action == ConnectionAction::Close {
                actions.push(ClientAction::Disconnect);
            }
        }
        self.session = None;
        self.reset_derived_state();

        actions.push(ClientAction::CountersChanged(self.counters.snapshot()));
        actions.push(ClientAction::PresenceChanged(self.presence));
        actions.push(ClientAction::Log { message: "session ended".to_string() });
        actions
    }

    fn handle_transport_connected(&mut self) -> Vec<ClientAction> {
        if self.connection.established().is_err() {
            // A stale connect callback after logout or teardown; ignore it
            // rather than apply state for a connection we no longer own.
            return vec![ClientAction::Log {
                message: "ignoring connect callback without a pending connect".to_string(),
            }];
        }

        let mut actions = vec![ClientAction::FetchSeeds];
        if let ChatContext::Active { room_id, .. } = &self.chat {
            // Reconnect path: re-join the room the open view is showing.
            actions.push(ClientAction::Emit(ClientDirective::JoinRoom {
                room_id: room_id.clone(),
            }));
        }
        actions.push(ClientAction::Log { message: "realtime transport connected".to_string() });
        actions
    }

    fn handle_transport_closed(&mut self, reason: &str) -> Vec<ClientAction> {
        if self.session.is_none() {
            // Intentional teardown already handled by SessionEnded.
            return vec![];
        }

        let mut actions = Vec::new();
        if self.presence != PeerPresence::default() {
            self.presence.clear();
            actions.push(ClientAction::PresenceChanged(self.presence));
        }

        match self.connection.lost(self.env.now(), self.env.random_u64()) {
            Ok(scheduled) => {
                for action in scheduled {
                    if let ConnectionAction::ScheduleRetry { delay } = action {
                        actions.push(ClientAction::Log {
                            message: format!(
                                "transport closed ({reason}); retrying in {}ms (attempt {})",
                                delay.as_millis(),
                                self.connection.attempts()
                            ),
                        });
                    }
                }
            },
            // Exhaustion is quiet: the user keeps the page they have, live
            // updates just stop until the next login.
            Err(err) => {
                actions.push(ClientAction::Log {
                    message: format!("transport closed ({reason}); {err}, live updates unavailable"),
                });
            },
        }
        actions
    }

    fn handle_server_event(&mut self, event: ServerEvent) -> Vec<ClientAction> {
        // Events from a closed or foreign connection are never applied.
        if self.session.is_none() || !self.connection.is_live() {
            return vec![];
        }

        match event {
            ServerEvent::NewMessage(message) => self.reconcile_new_message(message),
            ServerEvent::UserTyping { user_id, is_typing } => {
                self.update_presence(&user_id, |p| p.is_typing = is_typing)
            },
            ServerEvent::UserJoined { user_id } => {
                self.update_presence(&user_id, |p| p.is_online = true)
            },
            ServerEvent::UserLeft { user_id } => {
                self.update_presence(&user_id, |p| p.is_online = false)
            },
            ServerEvent::NewRequest(_) => {
                let _ = self.counters.record(CounterKind::Requests);
                vec![ClientAction::CountersChanged(self.counters.snapshot())]
            },
            ServerEvent::NewPost(_) => {
                let _ = self.counters.record(CounterKind::Posts);
                vec![ClientAction::CountersChanged(self.counters.snapshot())]
            },
        }
    }

    /// Apply a `new_message` event.
    ///
    /// The global chat counter increments for every delivery. The per-room
    /// append additionally happens only when the message's room matches the
    /// active view's room; messages for other rooms are dropped here.
    fn reconcile_new_message(&mut self, message: Message) -> Vec<ClientAction> {
        let _ = self.counters.record(CounterKind::Chat);
        let mut actions = vec![ClientAction::CountersChanged(self.counters.snapshot())];

        if let ChatContext::Active { room_id, .. } = &self.chat
            && *room_id == message.room_id
        {
            let applied = self.log.apply_confirmed(message.clone());
            let entry = studenthub_core::LogEntry {
                message,
                status: studenthub_core::DeliveryStatus::Confirmed,
            };
            actions.push(ClientAction::MessageDelivered { entry, applied });
        }

        actions
    }

    fn update_presence(
        &mut self,
        user_id: &UserId,
        apply: impl FnOnce(&mut PeerPresence),
    ) -> Vec<ClientAction> {
        let matches_active_peer = match &self.chat {
            ChatContext::Active { peer_id, .. } => peer_id == user_id,
            _ => false,
        };
        if !matches_active_peer {
            return vec![];
        }

        apply(&mut self.presence);
        vec![ClientAction::PresenceChanged(self.presence)]
    }

    fn handle_open_chat(&mut self, peer_id: UserId) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.is_none() {
            return Err(ClientError::NoSession { operation: "open_chat" });
        }

        let mut actions = Vec::new();

        // Switching conversations leaves the prior room explicitly and
        // clears state scoped to it.
        if let ChatContext::Active { room_id, .. } = &self.chat {
            if self.connection.is_live() {
                actions.push(ClientAction::Emit(ClientDirective::LeaveRoom {
                    room_id: room_id.clone(),
                }));
            }
            self.log.clear();
            self.presence.clear();
            actions.push(ClientAction::PresenceChanged(self.presence));
        }

        self.chat = ChatContext::Resolving { peer_id: peer_id.clone() };
        actions.push(ClientAction::ResolveRoom { peer_id });
        Ok(actions)
    }

    fn handle_room_resolved(&mut self, peer_id: UserId, room_id: RoomId) -> Vec<ClientAction> {
        match &self.chat {
            ChatContext::Resolving { peer_id: pending } if *pending == peer_id => {},
            _ => {
                // The view moved on while the resolution was in flight.
                return vec![ClientAction::Log {
                    message: format!("dropping stale room resolution for peer {peer_id}"),
                }];
            },
        }

        self.chat = ChatContext::Active { peer_id, room_id: room_id.clone() };

        let mut actions = Vec::new();
        if self.connection.is_live() {
            actions.push(ClientAction::Emit(ClientDirective::JoinRoom {
                room_id: room_id.clone(),
            }));
        }
        actions.push(ClientAction::FetchHistory { room_id });
        actions
    }

    fn handle_room_resolve_failed(&mut self, peer_id: &UserId, reason: &str) -> Vec<ClientAction> {
        match &self.chat {
            ChatContext::Resolving { peer_id: pending } if pending == peer_id => {},
            _ => return vec![],
        }

        // Aborts message loading for this view only; the connection is
        // untouched.
        self.chat = ChatContext::Idle;
        vec![
            ClientAction::SurfaceError { message: "Failed to get chat room".to_string() },
            ClientAction::Log { message: format!("room resolution failed for {peer_id}: {reason}") },
        ]
    }

    fn handle_history_loaded(
        &mut self,
        room_id: &RoomId,
        messages: Vec<Message>,
    ) -> Vec<ClientAction> {
        match &self.chat {
            ChatContext::Active { room_id: active, .. } if active == room_id => {},
            _ => {
                return vec![ClientAction::Log {
                    message: format!("dropping stale history for room {room_id}"),
                }];
            },
        }

        self.log.load_history(messages);
        vec![ClientAction::HistoryReplaced(self.log.entries().to_vec())]
    }

    fn handle_history_load_failed(&mut self, room_id: &RoomId, reason: &str) -> Vec<ClientAction> {
        match &self.chat {
            ChatContext::Active { room_id: active, .. } if active == room_id => {},
            _ => return vec![],
        }

        vec![
            ClientAction::SurfaceError { message: "Failed to load messages".to_string() },
            ClientAction::Log { message: format!("history fetch failed for {room_id}: {reason}") },
        ]
    }

    fn handle_seeds_loaded(&mut self, requests: u64, unread_chat: u64) -> Vec<ClientAction> {
        if self.session.is_none() {
            return vec![];
        }
        self.counters.seed(CounterKind::Requests, requests);
        self.counters.seed(CounterKind::Chat, unread_chat);
        vec![ClientAction::CountersChanged(self.counters.snapshot())]
    }

    fn handle_send_message(&mut self, content: String) -> Result<Vec<ClientAction>, ClientError> {
        let Some(session) = &self.session else {
            return Err(ClientError::NoSession { operation: "send_message" });
        };

        let ChatContext::Active { room_id, .. } = &self.chat else {
            return Ok(vec![ClientAction::SurfaceError {
                message: "No open conversation to send to".to_string(),
            }]);
        };

        if !self.connection.is_live() {
            // The optimistic append happens only when the directive is
            // actually emitted; a dead transport surfaces an error and
            // leaves the log untouched.
            return Ok(vec![ClientAction::SurfaceError {
                message: "Failed to send message".to_string(),
            }]);
        }

        let correlation_id = self.env.correlation_id();
        let message = Message {
            id: None,
            room_id: room_id.clone(),
            sender: session.user_ref(),
            content: content.clone(),
            created_at: self.env.unix_millis(),
            delivered_at: None,
            correlation_id: Some(correlation_id.clone()),
        };

        let room_id = room_id.clone();
        self.log.push_optimistic(message.clone());
        let entry = studenthub_core::LogEntry {
            message,
            status: studenthub_core::DeliveryStatus::Optimistic,
        };

        Ok(vec![
            ClientAction::MessageQueued(entry),
            ClientAction::Emit(ClientDirective::SendMessage { room_id, content, correlation_id }),
        ])
    }

    fn handle_view_opened(&mut self, kind: CounterKind) -> Vec<ClientAction> {
        self.counters.reset(kind);
        vec![ClientAction::CountersChanged(self.counters.snapshot())]
    }

    fn handle_close_chat(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if let ChatContext::Active { room_id, .. } = &self.chat
            && self.connection.is_live()
        {
            actions
                .push(ClientAction::Emit(ClientDirective::LeaveRoom { room_id: room_id.clone() }));
        }

        self.chat = ChatContext::Idle;
        self.log.clear();
        if self.presence != PeerPresence::default() {
            self.presence.clear();
            actions.push(ClientAction::PresenceChanged(self.presence));
        }
        actions
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        let Some(session) = &self.session else {
            return vec![];
        };

        match self.connection.poll_retry(now) {
            Some(ConnectionAction::Connect) => {
                vec![
                    ClientAction::Connect { token: session.token.clone() },
                    ClientAction::Log { message: "reconnect attempt due".to_string() },
                ]
            },
            _ => vec![],
        }
    }

    fn reset_derived_state(&mut self) {
        self.chat = ChatContext::Idle;
        self.log.clear();
        self.counters.reset_all();
        self.presence.clear();
    }
}
