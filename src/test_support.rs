//! In-memory doubles for unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::{ChatApi, ChunkHandler};
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::session_id::SessionId;
use crate::types::{
    ChatRequest, ChatState, CreatedSession, Message, MessageRole, Model, NewSession, SessionInfo,
    ToolCall,
};

/// Mutable state behind [`FakeApi`].
#[derive(Default)]
pub(crate) struct FakeState {
    pub chats: HashMap<SessionId, ChatState>,
    pub sessions: Vec<SessionInfo>,
    pub reply: Vec<String>,
    pub fail_stream: bool,
    pub stall_stream: bool,
    pub fail_create: bool,
    pub fail_list: bool,
    pub fail_messages: bool,
    pub fail_delete: bool,
    pub calls: Vec<String>,
    pub clock: i64,
}

impl FakeState {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn chat(&mut self, session: &SessionId) -> &mut ChatState {
        self.chats
            .entry(session.clone())
            .or_insert_with(|| ChatState::new(session.clone(), Model::default()))
    }

    fn answer(&mut self, session: &SessionId, message: &str, reply: &str) {
        let now = self.tick();
        let chat = self.chat(session);
        chat.messages.push(Message::user(message, now));
        chat.messages.push(Message {
            id: format!("a-{now}"),
            role: MessageRole::Assistant,
            content: reply.to_string(),
            timestamp: now,
            tool_calls: Vec::<ToolCall>::new(),
        });
    }
}

/// A scripted [`ChatApi`] that keeps sessions in memory.
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::replying(&["The capital of France ", "is Paris."])
    }

    pub fn replying(chunks: &[&str]) -> Self {
        let state = FakeState {
            reply: chunks.iter().map(|c| c.to_string()).collect(),
            ..FakeState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn seed_session(&self, id: &str, title: &str) {
        let mut state = self.state();
        let now = state.tick();
        state.sessions.push(SessionInfo {
            id: SessionId::from(id),
            title: title.to_string(),
            created_at: now,
            last_active: now,
        });
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn send_message(&self, session: &SessionId, request: ChatRequest) -> Result<ChatState> {
        let mut state = self.state();
        state.calls.push(format!("send {session}"));
        if state.fail_stream {
            return Err(Error::internal_server("model unavailable"));
        }
        let reply = state.reply.concat();
        state.answer(session, &request.message, &reply);
        if let Some(model) = request.model {
            state.chat(session).model = model;
        }
        Ok(state.chat(session).clone())
    }

    async fn stream_message(
        &self,
        session: &SessionId,
        message: &str,
        _model: Option<&Model>,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<()> {
        let (reply, stall) = {
            let mut state = self.state();
            state.calls.push(format!("stream {session}"));
            if state.fail_stream {
                return Err(Error::internal_server("model unavailable"));
            }
            (state.reply.clone(), state.stall_stream)
        };
        if stall {
            futures::future::pending::<()>().await;
        }
        let mut sent = String::new();
        for chunk in &reply {
            sent.push_str(chunk);
            if on_chunk(chunk).is_break() {
                self.state().answer(session, message, &sent);
                return Err(Error::abort("stream abandoned by caller"));
            }
        }
        self.state().answer(session, message, &sent);
        Ok(())
    }

    async fn get_messages(&self, session: &SessionId) -> Result<ChatState> {
        let mut state = self.state();
        state.calls.push(format!("messages {session}"));
        if state.fail_messages {
            return Err(Error::internal_server("Failed to load messages"));
        }
        Ok(state.chat(session).clone())
    }

    async fn clear_messages(&self, session: &SessionId) -> Result<ChatState> {
        let mut state = self.state();
        state.calls.push(format!("clear {session}"));
        let chat = state.chat(session);
        chat.messages.clear();
        Ok(chat.clone())
    }

    async fn update_model(&self, session: &SessionId, model: &Model) -> Result<ChatState> {
        let mut state = self.state();
        state.calls.push(format!("model {session} {model}"));
        let chat = state.chat(session);
        chat.model = model.clone();
        Ok(chat.clone())
    }

    async fn create_session(&self, request: NewSession) -> Result<CreatedSession> {
        let mut state = self.state();
        state.calls.push("create".to_string());
        if state.fail_create {
            return Err(Error::api(500, None, "Failed to create session"));
        }
        let now = state.tick();
        let id = request.session_id.unwrap_or_else(SessionId::generate);
        let title = request.title.unwrap_or_else(|| "New Chat".to_string());
        state.sessions.push(SessionInfo {
            id: id.clone(),
            title: title.clone(),
            created_at: now,
            last_active: now,
        });
        Ok(CreatedSession {
            session_id: id,
            title,
        })
    }

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let mut state = self.state();
        state.calls.push("list".to_string());
        if state.fail_list {
            return Err(Error::api(500, None, "Failed to list sessions"));
        }
        Ok(state.sessions.clone())
    }

    async fn delete_session(&self, session: &SessionId) -> Result<()> {
        let mut state = self.state();
        state.calls.push(format!("delete {session}"));
        if state.fail_delete {
            return Err(Error::not_found("Session not found", None, None));
        }
        state.sessions.retain(|s| &s.id != session);
        state.chats.remove(session);
        Ok(())
    }

    async fn update_session_title(&self, session: &SessionId, title: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(format!("rename {session}"));
        match state.sessions.iter_mut().find(|s| &s.id == session) {
            Some(info) => {
                info.title = title.to_string();
                Ok(())
            }
            None => Err(Error::not_found("Session not found", None, None)),
        }
    }

    async fn clear_all_sessions(&self) -> Result<usize> {
        let mut state = self.state();
        state.calls.push("clear-all".to_string());
        let count = state.sessions.len();
        state.sessions.clear();
        state.chats.clear();
        Ok(count)
    }
}

/// A [`Renderer`] that records what it was asked to show.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub text: String,
    pub errors: Vec<String>,
    pub infos: Vec<String>,
    pub interrupted: bool,
    pub interrupt_after: Option<usize>,
    pub chunks: usize,
}

impl Renderer for RecordingRenderer {
    fn print_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.chunks += 1;
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, info: &str) {
        self.infos.push(info.to_string());
    }

    fn print_message(&mut self, message: &Message) {
        self.infos.push(message.content.clone());
    }

    fn print_tool_call(&mut self, call: &ToolCall) {
        self.infos.push(call.summary());
    }

    fn finish_response(&mut self) {}

    fn print_interrupted(&mut self) {
        self.interrupted = true;
    }

    fn should_interrupt(&self) -> bool {
        self.interrupt_after.is_some_and(|n| self.chunks >= n)
    }
}

