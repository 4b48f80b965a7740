//! The interactive chat session.
//!
//! [`ChatSession`] ties a [`ChatStore`] to the local auth gate and turns slash commands and
//! plain lines into store operations, reporting outcomes through a [`Renderer`].

use crate::auth::{Authenticator, KeyValueStore, User};
use crate::chat::commands::{ChatCommand, SessionRef, help_text, parse_command};
use crate::client::ChatApi;
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::session_id::SessionId;
use crate::store::ChatStore;
use crate::types::{KnownModel, MessageRole, Model};
use crate::utils::{group_messages_by_date, now_millis};

/// What the read loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Read another line.
    Continue,
    /// Exit.
    Quit,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The active session.
    pub session_id: SessionId,
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Messages the user sent.
    pub user_messages: usize,
    /// Replies from the assistant.
    pub assistant_messages: usize,
    /// Tools the assistant invoked.
    pub tool_calls: usize,
    /// Sessions in the cached list.
    pub session_count: usize,
    /// Whether replies are streamed.
    pub streaming: bool,
    /// The logged-in user.
    pub user: Option<String>,
}

/// A chat session that routes user input to the store and the auth gate.
pub struct ChatSession<A: ChatApi, S: KeyValueStore> {
    store: ChatStore<A>,
    auth: Authenticator<S>,
}

impl<A: ChatApi, S: KeyValueStore> ChatSession<A, S> {
    /// Creates a new chat session.
    pub fn new(store: ChatStore<A>, auth: Authenticator<S>) -> Self {
        Self { store, auth }
    }

    /// The underlying store.
    pub fn store(&self) -> &ChatStore<A> {
        &self.store
    }

    /// The auth gate.
    pub fn auth(&self) -> &Authenticator<S> {
        &self.auth
    }

    /// The logged-in user; unreadable auth state counts as logged out.
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user().ok().flatten()
    }

    /// Gathers statistics about the active session.
    pub fn stats(&self) -> SessionStats {
        let state = self.store.state();
        let count = |role| state.messages.iter().filter(|m| m.role == role).count();
        SessionStats {
            session_id: state.session_id.clone(),
            model: state.model.clone(),
            message_count: state.messages.len(),
            user_messages: count(MessageRole::User),
            assistant_messages: count(MessageRole::Assistant),
            tool_calls: state.messages.iter().map(|m| m.tool_calls.len()).sum(),
            session_count: self.store.sessions().len(),
            streaming: self.store.is_streaming(),
            user: self.current_user().map(|u| u.username),
        }
    }

    /// Reloads the session list.
    pub async fn refresh_sessions(&mut self) -> Result<()> {
        self.store.refresh_sessions().await?;
        Ok(())
    }

    /// Handles one line of input: a slash command or a message.
    pub async fn handle_line(&mut self, line: &str, renderer: &mut dyn Renderer) -> Outcome {
        match parse_command(line) {
            Some(command) => self.handle_command(command, renderer).await,
            None => {
                self.send(line, renderer).await;
                Outcome::Continue
            }
        }
    }

    /// Sends a message if a user is logged in.
    ///
    /// Failures are reported by the store through `renderer`.
    pub async fn send(&mut self, line: &str, renderer: &mut dyn Renderer) {
        if !self.require_login(renderer) {
            return;
        }
        let _ = self.store.submit(line, renderer).await;
    }

    fn require_login(&self, renderer: &mut dyn Renderer) -> bool {
        if self.current_user().is_some() {
            true
        } else {
            renderer.print_error("Please /login (or /signup) first.");
            false
        }
    }

    fn resolve(&self, target: &SessionRef) -> Result<SessionId> {
        match target {
            SessionRef::Id(id) => Ok(SessionId::from(id.as_str())),
            SessionRef::Index(index) => self
                .store
                .sessions()
                .get(index - 1)
                .map(|s| s.id.clone())
                .ok_or_else(|| {
                    Error::validation(
                        format!("No session #{index}; use /sessions to list them."),
                        None,
                    )
                }),
        }
    }

    /// Executes a parsed command.
    pub async fn handle_command(
        &mut self,
        command: ChatCommand,
        renderer: &mut dyn Renderer,
    ) -> Outcome {
        match command {
            ChatCommand::Quit => return Outcome::Quit,
            ChatCommand::Help => {
                for line in help_text().lines() {
                    renderer.print_info(line);
                }
            }
            ChatCommand::Invalid(message) => renderer.print_error(&message),
            ChatCommand::Signup { username, password } => {
                match self.auth.signup(&username, &password) {
                    Ok(()) => renderer
                        .print_info(&format!("Account {username} created. Use /login to sign in.")),
                    Err(e) => renderer.print_error(e.message()),
                }
            }
            ChatCommand::Login { username, password } => {
                match self.auth.login(&username, &password) {
                    Ok(user) => {
                        renderer.print_info(&format!("Logged in as {}.", user.username));
                        if let Err(e) = self.store.refresh_sessions().await {
                            renderer.print_error(e.message());
                        }
                    }
                    Err(e) => renderer.print_error(e.message()),
                }
            }
            ChatCommand::Logout => match self.auth.logout() {
                Ok(()) => renderer.print_info("Logged out."),
                Err(e) => renderer.print_error(e.message()),
            },
            ChatCommand::WhoAmI => match self.current_user() {
                Some(user) => renderer.print_info(&format!("Logged in as {}.", user.username)),
                None => renderer.print_info("Not logged in."),
            },
            ChatCommand::Models => self.print_models(renderer),
            command => {
                if self.require_login(renderer) {
                    if let Err(e) = self.handle_session_command(command, renderer).await {
                        renderer.print_error(e.message());
                    }
                }
            }
        }
        Outcome::Continue
    }

    async fn handle_session_command(
        &mut self,
        command: ChatCommand,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        match command {
            ChatCommand::New => {
                let id = self.store.new_session().await?;
                renderer.print_info(&format!("Started session {id}."));
            }
            ChatCommand::Sessions => {
                self.store.refresh_sessions().await?;
                self.print_sessions(renderer);
            }
            ChatCommand::Switch(target) => {
                let id = self.resolve(&target)?;
                self.store.switch_session(id).await?;
                let title = self
                    .store
                    .sessions()
                    .iter()
                    .find(|s| &s.id == self.store.session_id())
                    .map(|s| s.title.clone())
                    .unwrap_or_else(|| self.store.session_id().to_string());
                renderer.print_info(&format!("Switched to {title}."));
                self.print_history(renderer);
            }
            ChatCommand::Rename(target, title) => {
                let id = self.resolve(&target)?;
                if self.store.rename_session(&id, &title).await? {
                    renderer.print_info(&format!("Renamed to {}.", title.trim()));
                }
            }
            ChatCommand::Delete(target) => {
                let id = self.resolve(&target)?;
                let active = &id == self.store.session_id();
                self.store.delete_session(&id).await?;
                renderer.print_info("Session deleted.");
                if active {
                    renderer.print_info(&format!(
                        "Started session {}.",
                        self.store.session_id()
                    ));
                }
            }
            ChatCommand::Clear => {
                self.store.clear_messages().await?;
                renderer.print_info("Conversation cleared.");
            }
            ChatCommand::ClearAll => {
                let count = self.store.clear_all_sessions().await?;
                renderer.print_info(&format!("Deleted {count} sessions."));
            }
            ChatCommand::Model(name) => {
                let state = self.store.change_model(Model::from(name.as_str())).await?;
                renderer.print_info(&format!("Model changed to: {}", state.model.display_name()));
            }
            ChatCommand::History => self.print_history(renderer),
            ChatCommand::Stats => self.print_stats(renderer),
            ChatCommand::Quit
            | ChatCommand::Help
            | ChatCommand::Invalid(_)
            | ChatCommand::Signup { .. }
            | ChatCommand::Login { .. }
            | ChatCommand::Logout
            | ChatCommand::WhoAmI
            | ChatCommand::Models => {}
        }
        Ok(())
    }

    fn print_sessions(&self, renderer: &mut dyn Renderer) {
        let sessions = self.store.sessions();
        if sessions.is_empty() {
            renderer.print_info("No sessions yet. Send a message to start one.");
            return;
        }
        for (index, session) in sessions.iter().enumerate() {
            let marker = if &session.id == self.store.session_id() {
                "*"
            } else {
                " "
            };
            renderer.print_info(&format!(
                "{marker} {:>2}. {} ({})",
                index + 1,
                session.title,
                session.id
            ));
        }
    }

    fn print_history(&self, renderer: &mut dyn Renderer) {
        let messages = &self.store.state().messages;
        if messages.is_empty() {
            renderer.print_info("No messages yet.");
            return;
        }
        for (label, group) in group_messages_by_date(messages, now_millis()) {
            renderer.print_date_header(&label);
            for message in group {
                renderer.print_message(message);
            }
        }
    }

    fn print_models(&self, renderer: &mut dyn Renderer) {
        let current = &self.store.state().model;
        for known in KnownModel::ALL {
            let marker = if *current == Model::Known(known) {
                "*"
            } else {
                " "
            };
            renderer.print_info(&format!("{marker} {} ({})", known.id(), known.display_name()));
        }
    }

    fn print_stats(&self, renderer: &mut dyn Renderer) {
        let stats = self.stats();
        renderer.print_info("Session Statistics:");
        renderer.print_info(&format!("  Session: {}", stats.session_id));
        renderer.print_info(&format!("  Model: {}", stats.model.display_name()));
        renderer.print_info(&format!(
            "  Messages: {} ({} from you, {} replies)",
            stats.message_count, stats.user_messages, stats.assistant_messages
        ));
        renderer.print_info(&format!("  Tool calls: {}", stats.tool_calls));
        renderer.print_info(&format!("  Sessions: {}", stats.session_count));
        renderer.print_info(&format!(
            "  Streaming: {}",
            if stats.streaming { "on" } else { "off" }
        ));
        renderer.print_info(&format!(
            "  User: {}",
            stats.user.as_deref().unwrap_or("(not logged in)")
        ));
    }
}
