//! Conversation orchestration for the chat application.
//!
//! [`ChatThread`] ties the session store to a transport: user turns are
//! appended to the session once the transport accepts them, and assistant
//! turns are appended as transport events arrive. The view layer only
//! renders and dispatches intents.

use crate::error::Result;
use crate::session::{Action, Session};
use crate::transport::{Transport, TransportEvent};
use crate::types::ChatMessage;

/// A conversation thread backed by a pluggable transport.
pub struct ChatThread {
    session: Session,
    transport: Box<dyn Transport>,
}

impl ChatThread {
    /// Creates a thread over a fresh session.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_session(Session::new(), transport)
    }

    /// Creates a thread over an existing session (for example one that has
    /// already completed the login flow).
    pub fn with_session(session: Session, transport: Box<dyn Transport>) -> Self {
        Self { session, transport }
    }

    /// Sends one user turn.
    ///
    /// Blank input is a silent no-op. Otherwise the text is handed to the
    /// transport first and appended to the session only once the transport
    /// accepts it; a rejected send leaves the conversation untouched. The
    /// matching assistant turn arrives later through
    /// [`ChatThread::next_event`].
    pub async fn send(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.transport.send(text).await?;
        self.session
            .apply(Action::MessageAdded(ChatMessage::user(text)));
        Ok(())
    }

    /// Waits for the next transport event, recording assistant turns.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        let event = self.transport.recv().await;
        if let Some(TransportEvent::Assistant(text)) = &event {
            self.session
                .apply(Action::MessageAdded(ChatMessage::assistant(text.clone())));
        }
        event
    }

    /// Dispatches a session action (login lifecycle, logout).
    pub fn apply(&mut self, action: Action) {
        self.session.apply(action);
    }

    /// Returns a read reference to the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.session.messages().len()
    }
}
