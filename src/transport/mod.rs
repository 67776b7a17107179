//! Transports for exchanging chat turns with the backend.
//!
//! The session store does not care how turns reach the backend; it drives
//! one of two transports behind the [`Transport`] trait:
//!
//! - [`RequestReplyTransport`]: one HTTP round trip per turn, with the
//!   degrade-to-message failure policy.
//! - [`StreamingTransport`]: a persistent WebSocket whose inbound frames
//!   arrive independently of any send.
//!
//! Both transports deliver assistant turns through [`Transport::recv`], so
//! a single event loop can serve either variant.

mod rest;
mod socket;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;

pub use rest::{FALLBACK_REPLY, RequestReplyTransport};
pub use socket::StreamingTransport;

/// An inbound event from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// An assistant turn arrived.
    Assistant(String),

    /// The transport failed and is now unusable. The caller should alert
    /// the user out of band; session state is untouched.
    Error(String),

    /// The transport is terminally closed. No reconnection is attempted.
    Closed,
}

/// The mechanism used to exchange chat turns with the backend.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Sends one user turn to the backend.
    ///
    /// The request/reply transport never fails here: backend errors are
    /// degraded to a fallback assistant turn. The streaming transport fails
    /// synchronously when the socket is not open; nothing is queued.
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Waits for the next inbound event.
    ///
    /// Returns `None` once the transport has reported [`TransportEvent::Closed`].
    async fn recv(&mut self) -> Option<TransportEvent>;
}

/// Which transport variant to use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Login-gated request/reply over HTTP.
    #[default]
    Rest,

    /// Unauthenticated raw text frames over a WebSocket.
    WebSocket,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Rest => write!(f, "rest"),
            TransportKind::WebSocket => write!(f, "websocket"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rest" | "http" => Ok(TransportKind::Rest),
            "websocket" | "ws" => Ok(TransportKind::WebSocket),
            other => Err(format!("unknown transport: {other} (use rest or websocket)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_kind_parses() {
        assert_eq!("rest".parse::<TransportKind>().unwrap(), TransportKind::Rest);
        assert_eq!(
            "WS".parse::<TransportKind>().unwrap(),
            TransportKind::WebSocket
        );
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
