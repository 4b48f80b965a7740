//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to manage accounts and sessions without sending messages
//! to the API.

/// Refers to a session by id or by its 1-based position in the session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    /// Position in the most recently shown list.
    Index(usize),
    /// Session id.
    Id(String),
}

impl SessionRef {
    fn parse(arg: &str) -> Self {
        let digits = arg.strip_prefix('#').unwrap_or(arg);
        match digits.parse::<usize>() {
            Ok(index) if index > 0 => SessionRef::Index(index),
            _ => SessionRef::Id(arg.to_string()),
        }
    }
}

/// A parsed chat command.
///
/// These commands control the chat client and are not sent as messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Register a user.
    Signup {
        /// Name to register.
        username: String,
        /// Password to register.
        password: String,
    },

    /// Log in.
    Login {
        /// Name to log in as.
        username: String,
        /// Password to check.
        password: String,
    },

    /// Log out.
    Logout,

    /// Show the logged-in user.
    WhoAmI,

    /// Start a new session.
    New,

    /// List sessions.
    Sessions,

    /// Make another session active.
    Switch(SessionRef),

    /// Rename a session.
    Rename(SessionRef, String),

    /// Delete a session.
    Delete(SessionRef),

    /// Clear the active session's messages.
    Clear,

    /// Delete every session.
    ClearAll,

    /// Change the model.
    Model(String),

    /// List known models.
    Models,

    /// Show the active session's messages.
    History,

    /// Display session statistics (message count, current model, etc.).
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use aethermind::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model qwen/qwen-plus").is_some());
/// assert!(parse_command("What is the capital of France?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "signup" => match credentials(argument) {
            Some((username, password)) => ChatCommand::Signup { username, password },
            None => ChatCommand::Invalid("/signup requires a username and password".to_string()),
        },
        "login" => match credentials(argument) {
            Some((username, password)) => ChatCommand::Login { username, password },
            None => ChatCommand::Invalid("/login requires a username and password".to_string()),
        },
        "logout" => ChatCommand::Logout,
        "whoami" => ChatCommand::WhoAmI,
        "new" => ChatCommand::New,
        "sessions" | "ls" => ChatCommand::Sessions,
        "switch" => match argument {
            Some(arg) => ChatCommand::Switch(SessionRef::parse(arg)),
            None => ChatCommand::Invalid("/switch requires a session id or number".to_string()),
        },
        "rename" => {
            let mut args = argument.unwrap_or_default().splitn(2, char::is_whitespace);
            let target = args.next().filter(|s| !s.is_empty());
            let title = args.next().map(str::trim).filter(|s| !s.is_empty());
            match (target, title) {
                (Some(target), Some(title)) => {
                    ChatCommand::Rename(SessionRef::parse(target), title.to_string())
                }
                _ => ChatCommand::Invalid("/rename requires a session and a title".to_string()),
            }
        }
        "delete" | "rm" => match argument {
            Some(arg) => ChatCommand::Delete(SessionRef::parse(arg)),
            None => ChatCommand::Invalid("/delete requires a session id or number".to_string()),
        },
        "clear" => ChatCommand::Clear,
        "clear-all" => ChatCommand::ClearAll,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "models" => ChatCommand::Models,
        "history" => ChatCommand::History,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

fn credentials(argument: Option<&str>) -> Option<(String, String)> {
    let mut parts = argument?.split_whitespace();
    let username = parts.next()?;
    let password = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((username.to_string(), password.to_string()))
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /signup <user> <pass>  Create an account
  /login <user> <pass>   Log in (required before chatting)
  /logout                Log out
  /whoami                Show the logged-in user
  /new                   Start a new session
  /sessions              List sessions
  /switch <id|#>         Switch to a session
  /rename <id|#> <title> Rename a session
  /delete <id|#>         Delete a session
  /clear                 Clear the current session's messages
  /clear-all             Delete every session
  /model <id>            Change the model (e.g., /model qwen/qwen-plus)
  /models                List known models
  /history               Show the current session's messages
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
