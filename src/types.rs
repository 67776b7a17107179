//! Data types for the parley SDK.
//!
//! Covers the in-memory conversation model and the wire shapes exchanged
//! with the backend's `/token` and `/chat` endpoints.

use serde::{Deserialize, Serialize};

/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single turn in the conversation.
///
/// Messages are immutable once created and are only ever appended to the
/// session's message log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: Role,

    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a new `ChatMessage` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Successful response body from the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// The bearer token for subsequent chat requests.
    pub access_token: String,

    /// The token type, always "bearer" for this backend.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The user's message text.
    pub content: String,
}

/// Successful response body from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn token_response_ignores_missing_token_type() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert!(parsed.token_type.is_none());
    }

    #[test]
    fn chat_request_wire_shape() {
        let body = serde_json::to_string(&ChatRequest {
            content: "hello".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"content":"hello"}"#);
    }
}
