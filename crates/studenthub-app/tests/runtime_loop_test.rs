//! Runtime loop tests with a scripted driver.
//!
//! `ScriptDriver` implements [`Driver`] the way a headless host would:
//! scripted user inputs, captured I/O commands, and canned backend
//! completions fed back as client events. The same [`Runtime`] orchestration
//! code that runs against a live backend drives the whole cycle here, with
//! virtual time for the reconnect path.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use studenthub_app::{App, AppAction, ConnectionBanner, Driver, IoCommand, Runtime};
use studenthub_client::ClientEvent;
use studenthub_core::{
    Session,
    env::{Environment, test_utils::MockEnv},
};
use studenthub_proto::{ClientDirective, Message, RoomId, ServerEvent, UserId, UserRef};

/// Error type for the scripted driver. Never produced; the script cannot
/// fail.
#[derive(Debug, Clone)]
struct ScriptError;

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("script driver error")
    }
}

impl std::error::Error for ScriptError {}

/// One scripted user input, consumed one per runtime cycle.
enum UserInput {
    Login,
    OpenChat(&'static str),
    Send(&'static str),
    DropTransport,
    AdvanceClock(Duration),
    Quit,
}

/// Shared state between the driver inside the runtime and the test.
#[derive(Default)]
struct SharedState {
    inputs: VecDeque<UserInput>,
    updates: VecDeque<ClientEvent>,
    executed: Vec<IoCommand>,
    rendered: usize,
    stopped: bool,
    final_app: Option<App>,
}

/// Scripted driver for deterministic runtime tests.
///
/// Executed commands are answered with canned backend completions, so the
/// runtime sees the same request/completion cycle a live host produces.
struct ScriptDriver {
    env: MockEnv,
    state: Arc<Mutex<SharedState>>,
}

impl ScriptDriver {
    fn new(env: MockEnv, script: Vec<UserInput>) -> Self {
        let state =
            SharedState { inputs: script.into_iter().collect(), ..SharedState::default() };
        Self { env, state: Arc::new(Mutex::new(state)) }
    }

    /// Handle to the shared state, for assertions after the runtime returns.
    fn shared(&self) -> Arc<Mutex<SharedState>> {
        Arc::clone(&self.state)
    }
}

impl Driver for ScriptDriver {
    type Error = ScriptError;
    type Instant = std::time::Instant;

    async fn poll_actions(&mut self, app: &mut App) -> Result<Vec<AppAction>, ScriptError> {
        let mut state = self.state.lock().unwrap();
        // Queued completions drain before the next user input, mirroring a
        // user who waits for the page to settle.
        if !state.updates.is_empty() {
            return Ok(vec![]);
        }
        let Some(input) = state.inputs.pop_front() else {
            return Ok(vec![]);
        };
        match input {
            UserInput::Login => Ok(app.login(session())),
            UserInput::OpenChat(peer) => Ok(app.open_chat(UserId::from(peer))),
            UserInput::Send(text) => Ok(app.send_message(text.to_string())),
            UserInput::DropTransport => {
                state
                    .updates
                    .push_back(ClientEvent::TransportClosed { reason: "eof".to_string() });
                Ok(vec![])
            },
            UserInput::AdvanceClock(by) => {
                self.env.advance(by);
                Ok(vec![])
            },
            UserInput::Quit => {
                state.final_app = Some(app.clone());
                Ok(app.quit())
            },
        }
    }

    async fn execute(&mut self, command: IoCommand) -> Result<(), ScriptError> {
        let mut state = self.state.lock().unwrap();
        match &command {
            IoCommand::Connect { .. } => {
                state.updates.push_back(ClientEvent::TransportConnected);
            },
            IoCommand::FetchSeeds => {
                state.updates.push_back(ClientEvent::SeedsLoaded { requests: 2, unread_chat: 5 });
            },
            IoCommand::ResolveRoom { peer_id } => {
                state.updates.push_back(ClientEvent::RoomResolved {
                    peer_id: peer_id.clone(),
                    room_id: RoomId::from("r1"),
                });
            },
            IoCommand::FetchHistory { room_id } => {
                state.updates.push_back(ClientEvent::HistoryLoaded {
                    room_id: room_id.clone(),
                    messages: vec![peer_message("hej")],
                });
            },
            // Sends are echoed back with the same correlation id, like the
            // backend broadcasting to the room.
            IoCommand::Emit(ClientDirective::SendMessage { room_id, content, correlation_id }) => {
                let echo = Message {
                    id: Some("m-echo".to_string()),
                    room_id: room_id.clone(),
                    sender: UserRef { id: UserId::from("u1"), first_name: None, last_name: None },
                    content: content.clone(),
                    created_at: 1_700_000_000_000,
                    delivered_at: Some(1_700_000_000_050),
                    correlation_id: Some(correlation_id.clone()),
                };
                state
                    .updates
                    .push_back(ClientEvent::EventReceived(ServerEvent::NewMessage(echo)));
            },
            IoCommand::Emit(_) | IoCommand::Disconnect => {},
        }
        state.executed.push(command);
        Ok(())
    }

    async fn recv_update(&mut self) -> Option<ClientEvent> {
        self.state.lock().unwrap().updates.pop_front()
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, _app: &App) -> Result<(), ScriptError> {
        self.state.lock().unwrap().rendered += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().stopped = true;
    }
}

fn session() -> Session {
    Session {
        user_id: UserId::from("u1"),
        first_name: "Asha".to_string(),
        last_name: None,
        token: "tok".to_string(),
    }
}

fn peer_message(content: &str) -> Message {
    Message {
        id: Some(format!("m-{content}")),
        room_id: RoomId::from("r1"),
        sender: UserRef { id: UserId::from("u2"), first_name: None, last_name: None },
        content: content.to_string(),
        created_at: 1_699_999_000_000,
        delivered_at: Some(1_699_999_000_100),
        correlation_id: None,
    }
}

#[tokio::test]
async fn runtime_drives_full_session_cycle() {
    let env = MockEnv::new();
    let driver = ScriptDriver::new(
        env.clone(),
        vec![
            UserInput::Login,
            UserInput::OpenChat("u2"),
            UserInput::Send("see you at the lab"),
            UserInput::Quit,
        ],
    );
    let shared = driver.shared();

    Runtime::new(driver, env).run().await.unwrap();

    let state = shared.lock().unwrap();
    assert!(state.stopped);
    assert!(state.rendered > 0);
    assert!(state.executed.contains(&IoCommand::Connect { token: "tok".to_string() }));
    assert!(state.executed.contains(&IoCommand::FetchSeeds));
    assert!(state.executed.contains(&IoCommand::ResolveRoom { peer_id: UserId::from("u2") }));
    assert!(state.executed.contains(&IoCommand::FetchHistory { room_id: RoomId::from("r1") }));
    assert!(state.executed.iter().any(|c| matches!(
        c,
        IoCommand::Emit(ClientDirective::JoinRoom { room_id }) if *room_id == RoomId::from("r1")
    )));

    // Oracle: the view the user quit from.
    let app = state.final_app.as_ref().unwrap();
    assert_eq!(app.connection(), ConnectionBanner::Live);
    assert_eq!(app.badges().requests, 2);
    assert_eq!(app.badges().chat, 6, "seed plus the echoed send");
    let chat = app.chat().unwrap();
    assert!(!chat.loading);
    assert_eq!(chat.lines.len(), 2, "one history line plus the confirmed send");
    assert!(chat.lines.iter().all(|line| !line.pending));
}

#[tokio::test]
async fn runtime_recovers_after_transport_loss() {
    let env = MockEnv::new();
    let driver = ScriptDriver::new(
        env.clone(),
        vec![
            UserInput::Login,
            UserInput::DropTransport,
            UserInput::AdvanceClock(Duration::from_secs(2)),
            UserInput::Quit,
        ],
    );
    let shared = driver.shared();

    Runtime::new(driver, env).run().await.unwrap();

    let state = shared.lock().unwrap();
    let connects =
        state.executed.iter().filter(|c| matches!(c, IoCommand::Connect { .. })).count();
    assert_eq!(connects, 2, "initial connect plus one retry");
    assert_eq!(state.final_app.as_ref().unwrap().connection(), ConnectionBanner::Live);
}
