//! Terminal front end for the AetherMind research assistant.
//!
//! This module provides the pieces of an interactive REPL built on top of the
//! aethermind client library. It supports:
//!
//! - Streaming responses with real-time display
//! - A local login gate in front of chatting
//! - Slash commands for session management
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Routing of input lines to the store and the auth gate
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, SessionRef, help_text, parse_command};
pub use config::{AUTH_FILE_ENV, ChatArgs, ChatConfig, default_auth_file};
pub use session::{ChatSession, Outcome, SessionStats};
