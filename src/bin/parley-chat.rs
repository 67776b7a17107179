//! Interactive terminal chat against the parley backend.
//!
//! This binary provides a REPL interface for the chat backend in either of
//! its two transport variants.
//!
//! # Usage
//!
//! ```bash
//! # Login-gated REST chat against the default backend
//! parley-chat
//!
//! # Point at another backend
//! parley-chat --base-url http://10.0.0.7:9000
//!
//! # Unauthenticated WebSocket chat
//! parley-chat --transport websocket
//!
//! # Disable colors (useful for piping output)
//! parley-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/stats` - Show session statistics
//! - `/logout` - Sign out and return to the login prompt (REST only)
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use parley::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatThread, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use parley::{
    Action, BackendClient, RequestReplyTransport, Session, StreamingTransport, TransportEvent,
    TransportKind,
};

/// What the message loop decided to do next.
enum Flow {
    Logout,
    Quit,
}

/// Main entry point for the parley-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("parley-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    println!(
        "Parley Chat ({} transport, backend {})",
        config.transport, config.base_url
    );
    println!("Type /help for commands, /quit to exit\n");

    match config.transport {
        TransportKind::Rest => run_rest(&config, &mut renderer).await,
        TransportKind::WebSocket => run_websocket(&config, &mut renderer).await,
    }
}

/// The login-gated REST variant: strictly one reply per send, so the loop
/// is sequential. `/logout` returns to the login prompt.
async fn run_rest(
    config: &ChatConfig,
    renderer: &mut PlainTextRenderer,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::with_base_url(&config.base_url)?;
    let mut rl = DefaultEditor::new()?;

    loop {
        let Some((session, token)) = login_flow(&client, &mut rl, renderer).await? else {
            // EOF at the login prompt.
            return Ok(());
        };

        let transport = RequestReplyTransport::new(client.clone(), token);
        let mut thread = ChatThread::with_session(session, Box::new(transport));

        match message_loop(&mut thread, &mut rl, renderer, config.transport).await? {
            Flow::Logout => continue,
            Flow::Quit => return Ok(()),
        }
    }
}

/// Prompts for credentials until a login succeeds.
///
/// Returns the authenticated session and its token, or `None` on EOF.
async fn login_flow(
    client: &BackendClient,
    rl: &mut DefaultEditor,
    renderer: &mut PlainTextRenderer,
) -> Result<Option<(Session, String)>, Box<dyn std::error::Error>> {
    let mut session = Session::new();

    loop {
        let username = match rl.readline("Username: ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if username.is_empty() {
            continue;
        }
        let password = match rl.readline("Password: ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        session.apply(Action::LoginStarted);
        renderer.print_info("Signing in...");

        match client.login(&username, &password).await {
            Ok(token) => {
                session.apply(Action::LoginSucceeded(token.clone()));
                if session.is_authenticated() {
                    renderer.print_info(&format!("Signed in as {username}.\n"));
                    return Ok(Some((session, token)));
                }
                renderer.print_error("Login failed");
            }
            Err(err) => {
                session.apply(Action::LoginFailed(err.message().to_string()));
                renderer.print_error(session.error());
            }
        }
    }
}

/// The sequential REST message loop: read a line, send, render the reply.
async fn message_loop(
    thread: &mut ChatThread,
    rl: &mut DefaultEditor,
    renderer: &mut PlainTextRenderer,
    transport: TransportKind,
) -> Result<Flow, Box<dyn std::error::Error>> {
    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            return Ok(Flow::Quit);
                        }
                        ChatCommand::Logout => {
                            thread.apply(Action::LoggedOut);
                            renderer.print_info("Signed out.\n");
                            return Ok(Flow::Logout);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(thread, transport);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if let Err(err) = thread.send(line).await {
                    renderer.print_error(&err.to_string());
                    continue;
                }
                if let Some(TransportEvent::Assistant(text)) = thread.next_event().await {
                    renderer.print_assistant(&text);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                return Ok(Flow::Quit);
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                return Ok(Flow::Quit);
            }
        }
    }
}

/// The WebSocket variant: inbound frames arrive independently of sends, so
/// input moves to a dedicated thread and the loop selects over both.
async fn run_websocket(
    config: &ChatConfig,
    renderer: &mut PlainTextRenderer,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = match StreamingTransport::connect(&config.base_url).await {
        Ok(transport) => transport,
        Err(err) => {
            renderer.print_error(&err.to_string());
            return Ok(());
        }
    };
    renderer.print_info("Connected.\n");

    let mut thread = ChatThread::new(Box::new(transport));
    let mut lines = spawn_input_thread("You: ");
    let mut open = true;

    enum Turn {
        Input(Option<String>),
        Event(Option<TransportEvent>),
    }

    loop {
        let turn = if open {
            tokio::select! {
                line = lines.recv() => Turn::Input(line),
                event = thread.next_event() => Turn::Event(event),
            }
        } else {
            Turn::Input(lines.recv().await)
        };

        match turn {
            Turn::Input(None) => {
                // Input thread ended (Ctrl+D).
                println!("\nGoodbye!");
                return Ok(());
            }
            Turn::Input(Some(line)) => {
                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            return Ok(());
                        }
                        ChatCommand::Logout => {
                            renderer
                                .print_error("The websocket transport has no login to sign out of");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&thread, config.transport);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if let Err(err) = thread.send(&line).await {
                    renderer.print_error(&err.to_string());
                }
            }
            Turn::Event(Some(TransportEvent::Assistant(text))) => {
                renderer.print_assistant(&text);
            }
            Turn::Event(Some(TransportEvent::Error(message))) => {
                renderer.print_error(&format!("WebSocket error: {message}"));
            }
            Turn::Event(Some(TransportEvent::Closed)) | Turn::Event(None) => {
                renderer.print_info("Connection closed.");
                open = false;
            }
        }
    }
}

/// Reads lines on a dedicated thread so the async loop can keep draining
/// inbound frames while the prompt is idle.
fn spawn_input_thread(prompt: &'static str) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let Ok(mut rl) = DefaultEditor::new() else {
            return;
        };
        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(_) => break,
            }
        }
    });
    rx
}

fn print_stats(thread: &ChatThread, transport: TransportKind) {
    let session = thread.session();
    println!("    Session Statistics:");
    println!("      Transport: {}", transport);
    println!("      Messages: {}", thread.message_count());
    println!(
        "      Authenticated: {}",
        if session.is_authenticated() {
            "yes"
        } else {
            "no"
        }
    );
}
