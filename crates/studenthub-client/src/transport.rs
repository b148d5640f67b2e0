//! WebSocket transport for the sync client.
//!
//! Provides [`ConnectedTransport`] which handles WebSocket I/O for the
//! realtime channel. This is a thin layer that just sends directives and
//! receives events - protocol logic remains in the sans-IO [`crate::SyncClient`].

use futures_util::{SinkExt, StreamExt};
use studenthub_proto::{ClientDirective, ServerEvent};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{client::IntoClientRequest, http::header::AUTHORIZATION, protocol::Message},
};

/// Transport errors.
///
/// Only connection setup fails with an error; once established, stream
/// failures surface as a [`TransportNotice::Closed`] notice instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Notifications the transport delivers to its owner.
#[derive(Debug)]
pub enum TransportNotice {
    /// A server event arrived.
    Event(ServerEvent),

    /// The connection dropped. No further notices follow.
    Closed {
        /// Close reason, as reported by the peer or the stream.
        reason: String,
    },
}

/// Handle to a live WebSocket connection.
///
/// Provides channels for the realtime traffic; an internal task handles the
/// socket I/O. Dropped directives and events after a close are expected - the
/// sync client re-synchronizes from REST on reconnect.
pub struct ConnectedTransport {
    /// Send directives to the server.
    pub to_server: mpsc::Sender<ClientDirective>,
    /// Receive events (and the final close notice) from the server.
    pub from_server: mpsc::Receiver<TransportNotice>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedTransport {
    /// Stop the connection task. Used for intentional closes; the task never
    /// emits `Closed` after an abort.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to the realtime endpoint, presenting the session token.
pub async fn connect(url: &str, token: &str) -> Result<ConnectedTransport, TransportError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| TransportError::Connection(format!("invalid url: {e}")))?;
    let bearer = format!("Bearer {token}")
        .parse()
        .map_err(|_| TransportError::Connection("token is not a valid header value".to_string()))?;
    request.headers_mut().insert(AUTHORIZATION, bearer);

    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| TransportError::Connection(format!("handshake failed: {e}")))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<ClientDirective>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportNotice>(32);

    let handle = tokio::spawn(run_connection(stream, to_server_rx, from_server_tx));

    Ok(ConnectedTransport {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut to_server: mpsc::Receiver<ClientDirective>,
    from_server: mpsc::Sender<TransportNotice>,
) {
    let (mut sink, mut source) = stream.split();

    let reason = loop {
        tokio::select! {
            directive = to_server.recv() => {
                let Some(directive) = directive else {
                    // Owner dropped its sender; treat as intentional close.
                    return;
                };
                match directive.encode() {
                    Ok(raw) => {
                        if let Err(e) = sink.send(Message::text(raw)).await {
                            break format!("write failed: {e}");
                        }
                    },
                    Err(e) => tracing::warn!("dropping unencodable directive: {e}"),
                }
            },

            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Text(raw))) => match ServerEvent::decode(&raw) {
                        Ok(event) => {
                            if from_server.send(TransportNotice::Event(event)).await.is_err() {
                                return;
                            }
                        },
                        // Unknown or malformed events are skipped, not fatal.
                        Err(e) => tracing::warn!("dropping malformed server event: {e}"),
                    },
                    Some(Ok(Message::Close(close))) => {
                        break close.map_or_else(
                            || "closed by server".to_string(),
                            |c| format!("closed by server: {}", c.reason),
                        );
                    },
                    // Pings are answered by the protocol layer on the next
                    // write; binary frames are not part of this protocol.
                    Some(Ok(_)) => {},
                    Some(Err(e)) => break format!("read failed: {e}"),
                    None => break "stream ended".to_string(),
                }
            },
        }
    };

    let _ = from_server.send(TransportNotice::Closed { reason }).await;
}
