//! REST client for the backend endpoints the sync layer depends on.
//!
//! Room resolution, message history, the two counter seeds, and logout. The
//! caller runs these in response to [`crate::ClientAction`]s and feeds the
//! results back into the sync client as events.

use studenthub_proto::{
    Message, RoomId, UserId,
    rest::{ApiError, ChatRoomResponse, MessageHistory, ReceivedRequests, UnreadCount},
};
use thiserror::Error;

/// REST errors.
#[derive(Debug, Error)]
pub enum RestError {
    /// Request could not be sent or the response not read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx status.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Backend-reported error message, when the body carried one.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("malformed body: {0}")]
    MalformedBody(#[from] studenthub_proto::ProtocolError),

    /// The room resolution response carried no room id in any known place.
    #[error("room response carried no room id")]
    MissingRoomId,
}

/// Client for the backend REST API.
///
/// Cookies are kept across requests because the backend pairs its bearer
/// token with a session cookie on some deployments.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, RestError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base_url: base_url.into() })
    }

    /// Resolve (or create) the room shared with a peer.
    ///
    /// `POST /chat/room` with the peer id; the room id is extracted from
    /// whichever of the known response shapes the backend used.
    pub async fn resolve_room(&self, token: &str, peer_id: &UserId) -> Result<RoomId, RestError> {
        let body = self
            .request_text(
                self.http
                    .post(format!("{}/chat/room", self.base_url))
                    .bearer_auth(token)
                    .json(&serde_json::json!({ "participantId": peer_id })),
            )
            .await?;

        ChatRoomResponse::decode(&body)?.room_id().ok_or(RestError::MissingRoomId)
    }

    /// Fetch message history for a room, oldest first.
    pub async fn fetch_history(
        &self,
        token: &str,
        room_id: &RoomId,
    ) -> Result<Vec<Message>, RestError> {
        let body = self
            .request_text(
                self.http
                    .get(format!("{}/chat/messages/{room_id}", self.base_url))
                    .bearer_auth(token),
            )
            .await?;

        Ok(MessageHistory::decode(&body)?.0)
    }

    /// Fetch the two counter seeds: pending request count and unread chat
    /// count. The two calls are independent; either may land first on the
    /// server side.
    pub async fn fetch_seeds(&self, token: &str) -> Result<(u64, u64), RestError> {
        let requests_body = self
            .request_text(
                self.http
                    .get(format!("{}/user/requests/received", self.base_url))
                    .bearer_auth(token),
            )
            .await?;
        let requests = ReceivedRequests::decode(&requests_body)?.data.len() as u64;

        let unread_body = self
            .request_text(
                self.http.get(format!("{}/chat/unread", self.base_url)).bearer_auth(token),
            )
            .await?;
        let unread = UnreadCount::decode(&unread_body)?.unread_count;

        Ok((requests, unread))
    }

    /// Invalidate the session on the backend.
    pub async fn logout(&self, token: &str) -> Result<(), RestError> {
        let _ = self
            .request_text(
                self.http.post(format!("{}/auth/logout", self.base_url)).bearer_auth(token),
            )
            .await?;
        Ok(())
    }

    /// Send a request and return the body text, mapping non-2xx statuses to
    /// [`RestError::Api`] with the backend's error message when present.
    async fn request_text(&self, request: reqwest::RequestBuilder) -> Result<String, RestError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string());
        Err(RestError::Api { status: status.as_u16(), message })
    }
}
