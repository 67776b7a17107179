// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod session;
pub mod transport;
pub mod types;

// Re-exports
pub use client::BackendClient;
pub use error::{Error, Result};
pub use session::{Action, AuthState, Session};
pub use transport::{
    FALLBACK_REPLY, RequestReplyTransport, StreamingTransport, Transport, TransportEvent,
    TransportKind,
};
pub use types::*;
