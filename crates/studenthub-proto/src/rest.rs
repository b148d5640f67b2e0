//! REST response shapes consumed by the sync core.
//!
//! Only the endpoints the sync layer needs are modeled here: room resolution,
//! message history, the two counter seeds, and the shared error body. The
//! rest of the backend surface (profiles, posts, discovery) belongs to the
//! host application, not this core.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ProtocolError, Result},
    events::{Message, UserRef},
    ids::RoomId,
};

/// Response of `POST /chat/room` (resolve-or-create room for a peer pair).
///
/// The backend is inconsistent about where the room id lives: sometimes
/// top-level `_id`, sometimes `id`, sometimes nested under `room`. This shape
/// tolerates all of them; [`ChatRoomResponse::room_id`] performs the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoomResponse {
    /// Room id under the Mongo-style key.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RoomId>,

    /// Room id under the plain key.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub plain_id: Option<RoomId>,

    /// Nested room object, when the backend wraps the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Box<ChatRoomResponse>>,
}

impl ChatRoomResponse {
    /// The resolved room id, wherever the backend put it.
    pub fn room_id(&self) -> Option<RoomId> {
        self.mongo_id
            .clone()
            .or_else(|| self.plain_id.clone())
            .or_else(|| self.room.as_ref().and_then(|r| r.room_id()))
    }

    /// Decode from a JSON body.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedBody(e.to_string()))
    }
}

/// Response of `GET /chat/messages/{roomId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHistory(pub Vec<Message>);

impl MessageHistory {
    /// Decode from a JSON body. A JSON `null` body decodes as empty history.
    pub fn decode(raw: &str) -> Result<Self> {
        let parsed: Option<Vec<Message>> =
            serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedBody(e.to_string()))?;
        Ok(Self(parsed.unwrap_or_default()))
    }
}

/// Response of `GET /user/requests/received` (seed for the requests counter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedRequests {
    /// Pending requests. Only the length matters to the counters.
    #[serde(default)]
    pub data: Vec<ReceivedRequest>,
}

impl ReceivedRequests {
    /// Decode from a JSON body.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedBody(e.to_string()))
    }
}

/// A single pending connection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRequest {
    /// Request id.
    #[serde(rename = "_id")]
    pub id: String,

    /// Requesting user, when the backend expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<UserRef>,
}

/// Response of `GET /chat/unread` (seed for the chat counter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    /// Number of unread chat messages across all rooms.
    #[serde(default)]
    pub unread_count: u64,
}

impl UnreadCount {
    /// Decode from a JSON body.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedBody(e.to_string()))
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error description.
    #[serde(default)]
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn room_id_lookup_tolerates_backend_shapes() {
        let top_level = ChatRoomResponse::decode(r#"{"_id": "r1"}"#).unwrap();
        assert_eq!(top_level.room_id(), Some(RoomId::from("r1")));

        let plain = ChatRoomResponse::decode(r#"{"id": "r2"}"#).unwrap();
        assert_eq!(plain.room_id(), Some(RoomId::from("r2")));

        let nested = ChatRoomResponse::decode(r#"{"room": {"id": "r3"}}"#).unwrap();
        assert_eq!(nested.room_id(), Some(RoomId::from("r3")));

        let empty = ChatRoomResponse::decode("{}").unwrap();
        assert_eq!(empty.room_id(), None);
    }

    #[test]
    fn mongo_id_wins_over_plain_id() {
        let both = ChatRoomResponse::decode(r#"{"_id": "canonical", "id": "alias"}"#).unwrap();
        assert_eq!(both.room_id(), Some(RoomId::from("canonical")));
    }

    #[test]
    fn null_history_is_empty() {
        assert_eq!(MessageHistory::decode("null").unwrap(), MessageHistory::default());
    }

    #[test]
    fn requests_seed_counts_entries() {
        let body = r#"{"data": [{"_id": "q1"}, {"_id": "q2"}, {"_id": "q3"}]}"#;
        let requests = ReceivedRequests::decode(body).unwrap();
        assert_eq!(requests.data.len(), 3);
    }

    #[test]
    fn unread_count_defaults_to_zero() {
        assert_eq!(UnreadCount::decode("{}").unwrap().unread_count, 0);
        assert_eq!(UnreadCount::decode(r#"{"unreadCount": 7}"#).unwrap().unread_count, 7);
    }
}
