//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::transport::TransportKind;

/// Default backend base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Command-line arguments for the parley-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: http://localhost:8000)", "URL")]
    pub base_url: Option<String>,

    /// Transport to use for chat turns.
    #[arrrg(optional, "Transport to use: rest or websocket (default: rest)", "KIND")]
    pub transport: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The backend base URL.
    pub base_url: String,

    /// The transport variant for chat turns.
    pub transport: TransportKind,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: http://localhost:8000
    /// - Transport: rest
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: TransportKind::Rest,
            use_color: true,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the transport variant.
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let transport = args
            .transport
            .map(|s| s.parse::<TransportKind>().unwrap_or_default())
            .unwrap_or_default();

        ChatConfig {
            base_url: args
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            transport,
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.transport, TransportKind::Rest);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.transport, TransportKind::Rest);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("http://10.0.0.7:9000".to_string()),
            transport: Some("websocket".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url, "http://10.0.0.7:9000");
        assert_eq!(config.transport, TransportKind::WebSocket);
        assert!(!config.use_color);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://127.0.0.1:8080")
            .with_transport(TransportKind::WebSocket)
            .without_color();

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.transport, TransportKind::WebSocket);
        assert!(!config.use_color);
    }
}
