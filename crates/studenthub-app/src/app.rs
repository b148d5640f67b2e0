//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the view
//! state of the host application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the notification badges shown in the navbar.
//! - Tracks the open chat view: conversation lines, peer presence, loading.
//! - Tracks the connection banner for UI feedback.

use studenthub_core::{Applied, CounterKind, CounterSnapshot, Session};
use studenthub_proto::UserId;

use crate::{AppAction, AppEvent, ChatLine, ChatView, ConnectionBanner};

/// Application view state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a backend.
#[derive(Debug, Clone)]
pub struct App {
    /// Whether a user is logged in.
    logged_in: bool,
    /// Connection banner.
    connection: ConnectionBanner,
    /// Notification badges.
    badges: CounterSnapshot,
    /// Open chat view. `None` when no conversation is open.
    chat: Option<ChatView>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a logged-out App.
    pub fn new() -> Self {
        Self {
            logged_in: false,
            connection: ConnectionBanner::Offline,
            badges: CounterSnapshot::default(),
            chat: None,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::ConnectionChanged(banner) => {
                self.connection = banner;
                vec![AppAction::Render]
            },
            AppEvent::BadgesChanged(snapshot) => {
                self.badges = snapshot;
                vec![AppAction::Render]
            },
            AppEvent::PresenceChanged(presence) => {
                if let Some(chat) = &mut self.chat {
                    chat.presence = presence;
                }
                vec![AppAction::Render]
            },
            AppEvent::HistoryLoaded(entries) => {
                if let Some(chat) = &mut self.chat {
                    chat.lines = entries.into_iter().map(ChatLine::from_entry).collect();
                    chat.loading = false;
                }
                vec![AppAction::Render]
            },
            AppEvent::MessageQueued(entry) => {
                if let Some(chat) = &mut self.chat {
                    chat.lines.push(ChatLine::from_entry(entry));
                }
                vec![AppAction::Render]
            },
            AppEvent::MessageDelivered { entry, applied } => {
                if let Some(chat) = &mut self.chat {
                    match applied {
                        Applied::Replaced => {
                            let confirmed = ChatLine::from_entry(entry);
                            if let Some(line) = chat.lines.iter_mut().find(|line| {
                                line.pending
                                    && line.message.correlation_id
                                        == confirmed.message.correlation_id
                            }) {
                                *line = confirmed;
                            } else {
                                chat.lines.push(confirmed);
                            }
                        },
                        Applied::Appended => chat.lines.push(ChatLine::from_entry(entry)),
                    }
                }
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Start a session for an authenticated user.
    pub fn login(&mut self, session: Session) -> Vec<AppAction> {
        self.logged_in = true;
        self.connection = ConnectionBanner::Connecting;
        self.badges = CounterSnapshot::default();
        self.chat = None;
        vec![AppAction::Login(session), AppAction::Render]
    }

    /// End the session and return to the logged-out view.
    pub fn logout(&mut self) -> Vec<AppAction> {
        self.logged_in = false;
        self.connection = ConnectionBanner::Offline;
        self.badges = CounterSnapshot::default();
        self.chat = None;
        self.status_message = None;
        vec![AppAction::Logout, AppAction::Render]
    }

    /// Open a conversation with a peer.
    pub fn open_chat(&mut self, peer_id: UserId) -> Vec<AppAction> {
        self.chat = Some(ChatView::new(peer_id.clone()));
        vec![AppAction::OpenChat { peer_id }, AppAction::Render]
    }

    /// Close the open conversation.
    pub fn close_chat(&mut self) -> Vec<AppAction> {
        self.chat = None;
        vec![AppAction::CloseChat, AppAction::Render]
    }

    /// Send a message in the open conversation.
    pub fn send_message(&self, content: String) -> Vec<AppAction> {
        vec![AppAction::SendMessage { content }, AppAction::Render]
    }

    /// Open the view that consumes a notification badge.
    pub fn open_view(&self, kind: CounterKind) -> Vec<AppAction> {
        vec![AppAction::OpenView { kind }, AppAction::Render]
    }

    /// Shut the host down.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Whether a user is logged in.
    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    /// Connection banner.
    pub fn connection(&self) -> ConnectionBanner {
        self.connection
    }

    /// Notification badges.
    pub fn badges(&self) -> CounterSnapshot {
        self.badges
    }

    /// Open chat view. `None` when no conversation is open.
    pub fn chat(&self) -> Option<&ChatView> {
        self.chat.as_ref()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use studenthub_core::{DeliveryStatus, LogEntry, PeerPresence};
    use studenthub_proto::{Message, RoomId, UserRef};

    use super::*;

    fn entry(content: &str, correlation_id: Option<&str>, status: DeliveryStatus) -> LogEntry {
        LogEntry {
            message: Message {
                id: None,
                room_id: RoomId::from("r1"),
                sender: UserRef { id: UserId::from("u1"), first_name: None, last_name: None },
                content: content.to_string(),
                created_at: 0,
                delivered_at: None,
                correlation_id: correlation_id.map(str::to_string),
            },
            status,
        }
    }

    fn app_with_chat() -> App {
        let mut app = App::new();
        let _ = app.login(Session {
            user_id: UserId::from("u1"),
            first_name: "Asha".to_string(),
            last_name: None,
            token: "tok".to_string(),
        });
        let _ = app.open_chat(UserId::from("u2"));
        app
    }

    #[test]
    fn open_chat_starts_loading() {
        let mut app = app_with_chat();
        assert!(app.chat().unwrap().loading);

        let _ = app.handle(AppEvent::HistoryLoaded(vec![entry(
            "hi",
            None,
            DeliveryStatus::Confirmed,
        )]));
        let chat = app.chat().unwrap();
        assert!(!chat.loading);
        assert_eq!(chat.lines.len(), 1);
    }

    #[test]
    fn queued_line_renders_pending() {
        let mut app = app_with_chat();
        let _ = app.handle(AppEvent::MessageQueued(entry(
            "hello",
            Some("c1"),
            DeliveryStatus::Optimistic,
        )));
        assert!(app.chat().unwrap().lines[0].pending);
    }

    #[test]
    fn delivered_replacement_clears_pending_flag() {
        let mut app = app_with_chat();
        let _ = app.handle(AppEvent::MessageQueued(entry(
            "hello",
            Some("c1"),
            DeliveryStatus::Optimistic,
        )));

        let _ = app.handle(AppEvent::MessageDelivered {
            entry: entry("hello", Some("c1"), DeliveryStatus::Confirmed),
            applied: Applied::Replaced,
        });

        let chat = app.chat().unwrap();
        assert_eq!(chat.lines.len(), 1);
        assert!(!chat.lines[0].pending);
    }

    #[test]
    fn delivered_append_adds_a_line() {
        let mut app = app_with_chat();
        let _ = app.handle(AppEvent::MessageDelivered {
            entry: entry("peer says hi", None, DeliveryStatus::Confirmed),
            applied: Applied::Appended,
        });
        assert_eq!(app.chat().unwrap().lines.len(), 1);
    }

    #[test]
    fn badges_update_without_open_chat() {
        let mut app = App::new();
        let actions = app.handle(AppEvent::BadgesChanged(CounterSnapshot {
            chat: 2,
            requests: 1,
            posts: 0,
        }));
        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.badges().chat, 2);
    }

    #[test]
    fn presence_only_lands_on_open_chat() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::PresenceChanged(PeerPresence {
            is_online: true,
            is_typing: false,
        }));
        assert!(app.chat().is_none());
    }

    #[test]
    fn logout_clears_view_state() {
        let mut app = app_with_chat();
        let _ = app.handle(AppEvent::BadgesChanged(CounterSnapshot {
            chat: 2,
            requests: 1,
            posts: 0,
        }));

        let actions = app.logout();
        assert!(actions.contains(&AppAction::Logout));
        assert!(!app.logged_in());
        assert!(app.chat().is_none());
        assert_eq!(app.badges(), CounterSnapshot::default());
        assert_eq!(app.connection(), ConnectionBanner::Offline);
    }

    #[test]
    fn api_send_message() {
        let app = app_with_chat();
        let actions = app.send_message("hello".to_string());
        assert!(matches!(actions.as_slice(), [AppAction::SendMessage { .. }, AppAction::Render]));
    }

    #[test]
    fn error_sets_status_message() {
        let mut app = app_with_chat();
        let _ = app.handle(AppEvent::Error { message: "Failed to send message".to_string() });
        assert_eq!(app.status_message(), Some("Error: Failed to send message"));
    }
}
