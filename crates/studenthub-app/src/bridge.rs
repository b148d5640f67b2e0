//! Protocol-to-application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`studenthub_client::SyncClient`] and
//! adapts it to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into sync client events.
//! - Accumulates outgoing [`IoCommand`]s to be executed by the driver in the
//!   next I/O cycle.
//! - Interprets actions from the client and converts them back into
//!   [`crate::AppEvent`]s to update the view.
//! - Tracks the connection banner and reports changes to the view.

use studenthub_client::{ClientAction, ClientEvent, SyncClient};
use studenthub_core::{ConnectionState, env::Environment};
use studenthub_proto::{ClientDirective, RoomId, UserId};

use crate::{AppAction, AppEvent, ConnectionBanner};

/// I/O the driver must perform on behalf of the sync client.
#[derive(Debug, Clone, PartialEq)]
pub enum IoCommand {
    /// Open the realtime transport, presenting the session token.
    Connect {
        /// Bearer token for transport authentication.
        token: String,
    },

    /// Close the realtime transport.
    Disconnect,

    /// Emit a directive over the open transport.
    Emit(ClientDirective),

    /// Resolve (or create) the room for a peer pair via REST.
    ResolveRoom {
        /// Peer to resolve a room for.
        peer_id: UserId,
    },

    /// Fetch message history for a room via REST.
    FetchHistory {
        /// Room to fetch history for.
        room_id: RoomId,
    },

    /// Run the two counter seed fetches via REST.
    FetchSeeds,
}

/// Bridge between App and sync client protocol logic.
///
/// Generic over Environment to support both production and virtual-time
/// testing. The Instant type is determined by the Environment's associated
/// type.
pub struct Bridge<E: Environment> {
    client: SyncClient<E>,
    outgoing: Vec<IoCommand>,
    banner: ConnectionBanner,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment.
    pub fn new(env: E) -> Self {
        Self {
            client: SyncClient::new(env),
            outgoing: Vec::new(),
            banner: ConnectionBanner::Offline,
        }
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::Login(session) => self.forward(ClientEvent::SessionStarted { session }),
            AppAction::Logout => self.forward(ClientEvent::SessionEnded),
            AppAction::OpenChat { peer_id } => self.forward(ClientEvent::OpenChat { peer_id }),
            AppAction::CloseChat => self.forward(ClientEvent::CloseChat),
            AppAction::SendMessage { content } => {
                self.forward(ClientEvent::SendMessage { content })
            },
            AppAction::OpenView { kind } => self.forward(ClientEvent::ViewOpened { kind }),
            AppAction::Render | AppAction::Quit => vec![],
        }
    }

    /// Feed a sync client event (transport callback, REST completion, tick)
    /// through to the client and return resulting App events.
    pub fn handle_client_event(&mut self, event: ClientEvent<E::Instant>) -> Vec<AppEvent> {
        self.forward(event)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        self.forward(ClientEvent::Tick { now })
    }

    /// Take pending outgoing I/O commands.
    pub fn take_outgoing(&mut self) -> Vec<IoCommand> {
        std::mem::take(&mut self.outgoing)
    }

    fn forward(&mut self, event: ClientEvent<E::Instant>) -> Vec<AppEvent> {
        let mut events = match self.client.handle(event) {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        };

        let banner = self.banner();
        if banner != self.banner {
            self.banner = banner;
            events.push(AppEvent::ConnectionChanged(banner));
        }
        events
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Connect { token } => {
                    self.outgoing.push(IoCommand::Connect { token });
                },
                ClientAction::Disconnect => {
                    self.outgoing.push(IoCommand::Disconnect);
                },
                ClientAction::Emit(directive) => {
                    self.outgoing.push(IoCommand::Emit(directive));
                },
                ClientAction::ResolveRoom { peer_id } => {
                    self.outgoing.push(IoCommand::ResolveRoom { peer_id });
                },
                ClientAction::FetchHistory { room_id } => {
                    self.outgoing.push(IoCommand::FetchHistory { room_id });
                },
                ClientAction::FetchSeeds => {
                    self.outgoing.push(IoCommand::FetchSeeds);
                },
                ClientAction::MessageQueued(entry) => {
                    events.push(AppEvent::MessageQueued(entry));
                },
                ClientAction::MessageDelivered { entry, applied } => {
                    events.push(AppEvent::MessageDelivered { entry, applied });
                },
                ClientAction::HistoryReplaced(entries) => {
                    events.push(AppEvent::HistoryLoaded(entries));
                },
                ClientAction::CountersChanged(snapshot) => {
                    events.push(AppEvent::BadgesChanged(snapshot));
                },
                ClientAction::PresenceChanged(presence) => {
                    events.push(AppEvent::PresenceChanged(presence));
                },
                ClientAction::SurfaceError { message } => {
                    events.push(AppEvent::Error { message });
                },
                ClientAction::Log { message } => {
                    tracing::debug!("{message}");
                },
            }
        }

        events
    }

    fn banner(&self) -> ConnectionBanner {
        match self.client.connection_state() {
            ConnectionState::Idle => ConnectionBanner::Offline,
            ConnectionState::Connecting => {
                if self.client.session().is_some() && self.banner == ConnectionBanner::Reconnecting
                {
                    // Retry in flight; stay on the reconnecting banner until
                    // the transport reports success.
                    ConnectionBanner::Reconnecting
                } else {
                    ConnectionBanner::Connecting
                }
            },
            ConnectionState::Connected => ConnectionBanner::Live,
            ConnectionState::Backoff => ConnectionBanner::Reconnecting,
            ConnectionState::Closed => {
                if self.client.session().is_some() {
                    ConnectionBanner::Unavailable
                } else {
                    ConnectionBanner::Offline
                }
            },
        }
    }
}
