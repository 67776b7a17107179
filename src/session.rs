//! The session store: authentication and conversation state.
//!
//! The session is a small state machine. Its authentication state is an
//! explicit enum rather than a bag of flags, so combinations like "has a
//! token but is not authenticated" cannot be represented. All mutation goes
//! through [`Session::apply`] with a closed set of [`Action`]s; an action
//! that is not legal in the current state leaves the session unchanged.

use crate::types::ChatMessage;

/// The authentication state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Not signed in. Holds the error from the most recent failed attempt.
    Anonymous {
        /// Error message from the last failed login, if any.
        error: Option<String>,
    },

    /// A login request is in flight.
    Authenticating,

    /// Signed in with a bearer token.
    Authenticated {
        /// The bearer token returned by the token endpoint.
        token: String,
    },
}

/// An action dispatched against the session store.
///
/// These are the only legal mutations of a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A login request was dispatched.
    LoginStarted,

    /// The token endpoint accepted the credentials.
    LoginSucceeded(String),

    /// The login attempt failed with the given message.
    LoginFailed(String),

    /// The user signed out.
    LoggedOut,

    /// A message arrived for the conversation log.
    ///
    /// Legal in every state: the streaming transport appends assistant
    /// frames without any authentication binding.
    MessageAdded(ChatMessage),
}

/// The client-held record of authentication and conversation state.
///
/// The session is exclusively owned by whoever drives the chat; everyone
/// else reads through the accessors and mutates through [`Session::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: AuthState,
    messages: Vec<ChatMessage>,
}

impl Session {
    /// Creates a new session in the initial anonymous state.
    pub fn new() -> Self {
        Self {
            state: AuthState::Anonymous { error: None },
            messages: Vec::new(),
        }
    }

    /// Applies an action, advancing the state machine.
    ///
    /// Transitions not in the table below are no-ops:
    ///
    /// - `Anonymous --LoginStarted--> Authenticating` (clears the error)
    /// - `Authenticating --LoginSucceeded--> Authenticated`
    /// - `Authenticating --LoginFailed--> Anonymous` (records the error)
    /// - `Authenticated --LoggedOut--> Anonymous` (clears the message log)
    /// - `* --MessageAdded--> *` (append only)
    pub fn apply(&mut self, action: Action) {
        match (&self.state, action) {
            (AuthState::Anonymous { .. }, Action::LoginStarted) => {
                self.state = AuthState::Authenticating;
            }
            (AuthState::Authenticating, Action::LoginSucceeded(token)) => {
                // An empty token never counts as authenticated.
                self.state = if token.is_empty() {
                    AuthState::Anonymous { error: None }
                } else {
                    AuthState::Authenticated { token }
                };
            }
            (AuthState::Authenticating, Action::LoginFailed(message)) => {
                self.state = AuthState::Anonymous {
                    error: Some(message),
                };
            }
            (AuthState::Authenticated { .. }, Action::LoggedOut) => {
                self.state = AuthState::Anonymous { error: None };
                self.messages.clear();
            }
            (_, Action::MessageAdded(message)) => {
                self.messages.push(message);
            }
            // Everything else is illegal in the current state.
            (_, _) => {}
        }
    }

    /// Returns the current authentication state.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Returns the bearer token, if authenticated.
    pub fn token(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { token } => Some(token),
            _ => None,
        }
    }

    /// Returns true if the session holds a token.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    /// Returns true while a login request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, AuthState::Authenticating)
    }

    /// Returns the error from the last failed login, or the empty string.
    pub fn error(&self) -> &str {
        match &self.state {
            AuthState::Anonymous { error: Some(e) } => e,
            _ => "",
        }
    }

    /// Returns the conversation log in append order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn check_invariant(session: &Session) {
        assert_eq!(
            session.is_authenticated(),
            session.token().is_some_and(|t| !t.is_empty())
        );
    }

    #[test]
    fn initial_state() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert_eq!(session.error(), "");
        assert!(session.token().is_none());
        assert!(session.messages().is_empty());
        check_invariant(&session);
    }

    #[test]
    fn successful_login_flow() {
        let mut session = Session::new();
        session.apply(Action::LoginStarted);
        assert!(session.is_loading());
        assert_eq!(session.error(), "");
        check_invariant(&session);

        session.apply(Action::LoginSucceeded("abc".to_string()));
        assert!(session.is_authenticated());
        assert!(!session.is_loading());
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.error(), "");
        check_invariant(&session);
    }

    #[test]
    fn failed_login_records_error_and_no_token() {
        let mut session = Session::new();
        session.apply(Action::LoginStarted);
        session.apply(Action::LoginFailed("Bad credentials".to_string()));
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert!(session.token().is_none());
        assert_eq!(session.error(), "Bad credentials");
        check_invariant(&session);
    }

    #[test]
    fn retry_after_failure_clears_error() {
        let mut session = Session::new();
        session.apply(Action::LoginStarted);
        session.apply(Action::LoginFailed("Bad credentials".to_string()));
        session.apply(Action::LoginStarted);
        assert_eq!(session.error(), "");
        assert!(session.is_loading());
        check_invariant(&session);
    }

    #[test]
    fn logout_restores_initial_defaults() {
        let mut session = Session::new();
        session.apply(Action::LoginStarted);
        session.apply(Action::LoginSucceeded("abc".to_string()));
        session.apply(Action::MessageAdded(ChatMessage::user("hi")));
        session.apply(Action::MessageAdded(ChatMessage::assistant("Echo: hi")));

        session.apply(Action::LoggedOut);
        assert_eq!(session, Session::new());
        check_invariant(&session);
    }

    #[test]
    fn messages_append_in_order() {
        let mut session = Session::new();
        session.apply(Action::MessageAdded(ChatMessage::assistant("hi")));
        session.apply(Action::MessageAdded(ChatMessage::assistant("there")));
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::new(Role::Assistant, "hi"));
        assert_eq!(messages[1], ChatMessage::new(Role::Assistant, "there"));
        check_invariant(&session);
    }

    #[test]
    fn send_order_pairs() {
        // N sends, each appending one user and one assistant message,
        // produce exactly 2N entries in call order.
        let mut session = Session::new();
        session.apply(Action::LoginStarted);
        session.apply(Action::LoginSucceeded("abc".to_string()));
        for i in 0..3 {
            session.apply(Action::MessageAdded(ChatMessage::user(format!("m{i}"))));
            session.apply(Action::MessageAdded(ChatMessage::assistant(format!(
                "Echo: m{i}"
            ))));
        }
        assert_eq!(session.messages().len(), 6);
        for (i, pair) in session.messages().chunks(2).enumerate() {
            assert_eq!(pair[0], ChatMessage::user(format!("m{i}")));
            assert_eq!(pair[1], ChatMessage::assistant(format!("Echo: m{i}")));
        }
    }

    #[test]
    fn empty_token_is_not_authenticated() {
        let mut session = Session::new();
        session.apply(Action::LoginStarted);
        session.apply(Action::LoginSucceeded(String::new()));
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        check_invariant(&session);
    }

    #[test]
    fn illegal_transitions_are_no_ops() {
        let mut session = Session::new();

        // Success/failure/logout mean nothing before a login starts.
        session.apply(Action::LoginSucceeded("abc".to_string()));
        assert_eq!(session, Session::new());
        session.apply(Action::LoginFailed("nope".to_string()));
        assert_eq!(session, Session::new());
        session.apply(Action::LoggedOut);
        assert_eq!(session, Session::new());

        // A second LoginStarted while authenticating changes nothing.
        session.apply(Action::LoginStarted);
        let snapshot = session.clone();
        session.apply(Action::LoginStarted);
        assert_eq!(session, snapshot);

        // LoginStarted while authenticated changes nothing.
        session.apply(Action::LoginSucceeded("abc".to_string()));
        let snapshot = session.clone();
        session.apply(Action::LoginStarted);
        assert_eq!(session, snapshot);
        check_invariant(&session);
    }
}
