//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the backend.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Sign out, clearing the session back to its defaults.
    Logout,

    /// Display session statistics (message count, transport, auth state).
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use parley::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/logout").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();

    let result = match command.as_str() {
        "logout" => ChatCommand::Logout,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /logout                Sign out and return to the login prompt
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_logout() {
        assert_eq!(parse_command("/logout"), Some(ChatCommand::Logout));
        assert_eq!(parse_command("/LOGOUT"), Some(ChatCommand::Logout));
    }

    #[test]
    fn parse_stats() {
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Stats));
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(
            parse_command("/teleport"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("/teleport")
        ));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(!help.is_empty());
        assert!(help.contains("/quit"));
        assert!(help.contains("/logout"));
        assert!(help.contains("/stats"));
    }
}
