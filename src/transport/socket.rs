use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{SOCKET_CONNECTS, SOCKET_ERRORS, SOCKET_FRAMES_IN, SOCKET_FRAMES_OUT};
use crate::transport::{Transport, TransportEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Streaming transport: one persistent WebSocket per session.
///
/// Outbound user turns become raw text frames; every inbound text frame is
/// one assistant turn, with no correlation to any prior send. The socket
/// carries no authentication. Once closed or errored it stays unusable;
/// reconnecting means constructing a new transport.
pub struct StreamingTransport {
    ws: Option<WsStream>,
}

impl StreamingTransport {
    /// Connects to the backend's `/ws` endpoint derived from `base_url`.
    pub async fn connect(base_url: &str) -> Result<Self> {
        let url = websocket_url(base_url)?;
        let (ws, _) = connect_async(url.as_str()).await.map_err(|e| {
            SOCKET_ERRORS.click();
            Error::socket(
                format!("Unable to connect to the server: {}", e),
                Some(Box::new(e)),
            )
        })?;
        SOCKET_CONNECTS.click();
        Ok(Self { ws: Some(ws) })
    }

    /// Returns true while the socket is usable.
    pub fn is_open(&self) -> bool {
        self.ws.is_some()
    }
}

#[async_trait::async_trait]
impl Transport for StreamingTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        let Some(ws) = self.ws.as_mut() else {
            // No queue and no retry: the caller is told immediately.
            return Err(Error::socket(
                "WebSocket is not connected. Unable to send messages.",
                None,
            ));
        };

        match ws.send(WsMessage::Text(text.to_string())).await {
            Ok(()) => {
                SOCKET_FRAMES_OUT.click();
                Ok(())
            }
            Err(e) => {
                SOCKET_ERRORS.click();
                self.ws = None;
                Err(e.into())
            }
        }
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        loop {
            let frame = self.ws.as_mut()?.next().await;
            match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    SOCKET_FRAMES_IN.click();
                    return Some(TransportEvent::Assistant(text));
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    self.ws = None;
                    return Some(TransportEvent::Closed);
                }
                // Pings are answered by tungstenite itself; pongs and
                // binary frames carry nothing for the conversation.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    SOCKET_ERRORS.click();
                    self.ws = None;
                    return Some(TransportEvent::Error(e.to_string()));
                }
            }
        }
    }
}

/// Derives the `/ws` endpoint from an HTTP base URL.
fn websocket_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?.join("/ws")?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::url(format!("cannot derive a websocket URL from {base_url}"), None))?;
    Ok(url)
}
