//! Client-emitted directives.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ProtocolError, Result},
    ids::RoomId,
};

/// Directives the client emits over the realtime channel.
///
/// Same envelope as [`crate::ServerEvent`]:
/// `{"event": "<snake_case name>", "data": {...}}`.
///
/// # Invariants
///
/// - `join_room` is emitted at most once per open chat view; switching
///   conversations emits `leave_room` for the prior room first.
/// - `send_message` always carries a fresh client-generated correlation id so
///   the server echo can be reconciled against the optimistic copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientDirective {
    /// Join a conversation room.
    JoinRoom {
        /// Room to join.
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },

    /// Leave a conversation room.
    LeaveRoom {
        /// Room to leave.
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },

    /// Send a chat message to a room.
    SendMessage {
        /// Target room.
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// Message text.
        content: String,
        /// Client-generated correlation id (hex-encoded random u128).
        #[serde(rename = "correlationId")]
        correlation_id: String,
    },
}

impl ClientDirective {
    /// Decode a directive from its JSON envelope.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedDirective(e.to_string()))
    }

    /// Encode this directive into its JSON envelope.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::MalformedDirective(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn join_room_envelope_shape() {
        let directive = ClientDirective::JoinRoom { room_id: RoomId::from("r42") };
        let raw = directive.encode().unwrap();
        assert_eq!(raw, r#"{"event":"join_room","data":{"roomId":"r42"}}"#);
    }

    #[test]
    fn send_message_roundtrip() {
        let directive = ClientDirective::SendMessage {
            room_id: RoomId::from("r1"),
            content: "see you at the lab".to_string(),
            correlation_id: "00ff00ff".to_string(),
        };

        let decoded = ClientDirective::decode(&directive.encode().unwrap()).unwrap();
        assert_eq!(decoded, directive);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(
            ClientDirective::decode("not json"),
            Err(ProtocolError::MalformedDirective(_))
        ));
    }
}
