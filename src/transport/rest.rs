use std::collections::VecDeque;

use crate::client::BackendClient;
use crate::error::Result;
use crate::transport::{Transport, TransportEvent};

/// Assistant turn substituted for any failed chat request.
///
/// Failures degrade to a regular message rather than a session error, so
/// the user always sees some assistant turn.
pub const FALLBACK_REPLY: &str = "Sorry, there was an error processing your request.";

/// Request/reply transport: one HTTP round trip per user turn.
///
/// Each `send` resolves the assistant's reply (or the fallback) and buffers
/// it for the next `recv`, so a send is always followed by exactly one
/// assistant event.
pub struct RequestReplyTransport {
    client: BackendClient,
    token: String,
    pending: VecDeque<String>,
}

impl RequestReplyTransport {
    /// Creates a transport bound to an authenticated session's token.
    pub fn new(client: BackendClient, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            pending: VecDeque::new(),
        }
    }
}

#[async_trait::async_trait]
impl Transport for RequestReplyTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        let reply = match self.client.chat(text, &self.token).await {
            Ok(reply) => reply,
            Err(_) => FALLBACK_REPLY.to_string(),
        };
        self.pending.push_back(reply);
        Ok(())
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        match self.pending.pop_front() {
            Some(reply) => Some(TransportEvent::Assistant(reply)),
            // Nothing buffered and nothing will arrive unsolicited; pend so
            // a select-driven caller keeps waiting on user input instead.
            None => futures::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_chat_degrades_to_fallback_reply() {
        // Nothing listens on this address, so the chat call fails and the
        // transport must still buffer exactly one assistant turn.
        let client = BackendClient::with_base_url("http://127.0.0.1:1").unwrap();
        let mut transport = RequestReplyTransport::new(client, "abc");

        transport.send("hello").await.unwrap();
        assert_eq!(
            transport.recv().await,
            Some(TransportEvent::Assistant(FALLBACK_REPLY.to_string()))
        );
    }

    #[tokio::test]
    async fn recv_pends_while_no_reply_is_buffered() {
        let client = BackendClient::with_base_url("http://127.0.0.1:1").unwrap();
        let mut transport = RequestReplyTransport::new(client, "abc");

        let recv = transport.recv();
        tokio::pin!(recv);
        assert!(
            tokio::time::timeout(std::time::Duration::from_millis(50), &mut recv)
                .await
                .is_err()
        );
    }
}
