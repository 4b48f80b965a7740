//! Interactive chat client for the AetherMind research assistant.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local server
//! aethermind-chat
//!
//! # Point at another server and pick a model
//! aethermind-chat --base-url https://research.example.com/ --model qwen/qwen-plus
//!
//! # Disable colors and streaming (useful for piping output)
//! aethermind-chat --no-color --no-stream
//! ```
//!
//! # Commands
//!
//! - `/signup <user> <pass>`, `/login <user> <pass>` - Chatting requires a login
//! - `/sessions`, `/switch <#>`, `/new` - Move between conversations
//! - `/help` - Show every command
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use aethermind::chat::{ChatArgs, ChatConfig, ChatSession, Outcome, PlainTextRenderer, Renderer};
use aethermind::{Authenticator, ChatClient, ChatStore, FileStore};

/// Main entry point for the aethermind-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("aethermind-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = ChatClient::with_options(config.base_url.clone(), Some(config.timeout))?;
    let store = ChatStore::new(client, config.model.clone()).with_streaming(config.streaming);
    let auth = Authenticator::new(FileStore::new(config.auth_file.clone()));
    let mut session = ChatSession::new(store, auth);

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut renderer =
        PlainTextRenderer::with_color_and_interrupt(config.use_color, interrupted.clone());
    let mut rl = DefaultEditor::new()?;

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    renderer.print_info(&format!(
        "AetherMind Chat ({} at {})",
        config.model.display_name(),
        session.store().api().base_url()
    ));
    match session.current_user() {
        Some(user) => {
            renderer.print_info(&format!("Logged in as {}.", user.username));
            if let Err(e) = session.refresh_sessions().await {
                renderer.print_error(e.message());
            }
        }
        None => renderer.print_info("Use /signup or /login to start chatting."),
    }
    renderer.print_info("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if session.handle_line(line, &mut renderer).await == Outcome::Quit {
                    println!("Goodbye!");
                    break;
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
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}
