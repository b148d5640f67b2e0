//! Server-pushed events.
//!
//! Every live update arrives as one of these events, in transport-delivery
//! order. The sync client applies them strictly in that order; nothing here
//! is coalesced or reordered.
//!
//! Field names follow the backend's camelCase JSON (Mongo-style `_id` keys
//! included), so fixtures captured from the real API decode unchanged.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ProtocolError, Result},
    ids::{RoomId, UserId},
};

/// Events pushed by the server over the realtime channel.
///
/// Envelope on the wire: `{"event": "<snake_case name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A chat message was delivered to a room this client belongs to.
    NewMessage(Message),

    /// A peer started or stopped typing in a room.
    UserTyping {
        /// Peer whose typing state changed.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// Whether the peer is currently typing.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },

    /// A peer came online in the active room.
    UserJoined {
        /// Peer that joined.
        #[serde(rename = "userId")]
        user_id: UserId,
    },

    /// A peer went offline in the active room.
    UserLeft {
        /// Peer that left.
        #[serde(rename = "userId")]
        user_id: UserId,
    },

    /// A new connection request arrived for this user.
    ///
    /// The payload is informational only; the counters ignore it.
    NewRequest(RequestNotice),

    /// A new community post was published.
    ///
    /// The payload is informational only; the counters ignore it.
    NewPost(PostNotice),
}

impl ServerEvent {
    /// Decode a server event from its JSON envelope.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedEvent(e.to_string()))
    }

    /// Encode this event into its JSON envelope.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::MalformedEvent(e.to_string()))
    }
}

/// A chat message as carried on the wire.
///
/// Two provenances share this shape: server-confirmed messages (echoed to all
/// room members, `id` set) and client-synthesized optimistic messages (`id`
/// absent, `correlation_id` set). The correlation id is how a confirmed echo
/// is matched back to the sender's optimistic copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Backend-assigned message id. Absent on optimistic copies.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Room this message belongs to.
    pub room_id: RoomId,

    /// Sender reference.
    pub sender: UserRef,

    /// Message text.
    pub content: String,

    /// Creation time, unix milliseconds.
    pub created_at: i64,

    /// Delivery time, unix milliseconds. Set by the backend once delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,

    /// Client-generated correlation id, echoed back by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Minimal sender reference embedded in a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    /// Sender's user id.
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Display first name, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Display last name, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Payload of a `new_request` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestNotice {
    /// User who sent the connection request, when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<UserRef>,
}

/// Payload of a `new_post` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostNotice {
    /// Backend-assigned post id, when included.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,

    /// Post category (event, internship, placement), when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
