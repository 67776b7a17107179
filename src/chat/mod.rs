//! Chat application module for talking to the backend from a terminal.
//!
//! This module provides a REPL chat interface built on top of the parley
//! client library. It supports:
//!
//! - A login-gated REST conversation (one HTTP round trip per turn)
//! - An unauthenticated WebSocket conversation with unsolicited replies
//! - Slash commands for session control
//! - ANSI-styled output
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`thread`]: conversation orchestration over a pluggable transport
//! - [`commands`]: Slash command parsing and handling
//! - [`render`]: output rendering

mod commands;
mod config;
mod render;
mod thread;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer};
pub use thread::ChatThread;
