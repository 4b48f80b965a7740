//! The chat state store.
//!
//! [`ChatStore`] owns the active session's [`ChatState`], the session list, and the session id
//! allocator.  It sequences a send as: optimistic user message, optional first-send session
//! registration, streamed reply, canonical reload.  Only one send can be in flight, and the
//! active session cannot change while it is.

use std::ops::{ControlFlow, Deref, DerefMut};

use time::OffsetDateTime;

use crate::assembler::StreamAssembler;
use crate::client::{ChatApi, ChatClient};
use crate::error::{Error, Result};
use crate::observability::{STORE_RELOAD_ERRORS, STORE_SEND_ERRORS, STORE_SENDS};
use crate::render::Renderer;
use crate::session_cache::SessionListCache;
use crate::session_id::{SessionId, SessionIdAllocator};
use crate::types::{ChatRequest, ChatState, Message, MessageRole, Model, NewSession, SessionInfo};
use crate::utils::{generate_session_title, now_millis};

/// Whether a send is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ready for a send or a session change.
    #[default]
    Idle,
    /// A message has been submitted and its reply has not been reconciled.
    Sending,
}

/// Single source of truth for the active conversation.
pub struct ChatStore<A: ChatApi = ChatClient> {
    api: A,
    ids: SessionIdAllocator,
    cache: SessionListCache,
    state: ChatState,
    phase: Phase,
    streaming: bool,
}

impl<A: ChatApi> ChatStore<A> {
    /// Creates a store with a fresh session and the given model selected.
    pub fn new(api: A, model: Model) -> Self {
        let ids = SessionIdAllocator::new();
        let state = ChatState::new(ids.current().clone(), model);
        Self {
            api,
            ids,
            cache: SessionListCache::new(),
            state,
            phase: Phase::Idle,
            streaming: true,
        }
    }

    /// Chooses between streamed and whole replies.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// The transport.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The active session's state.
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// The active session id.
    pub fn session_id(&self) -> &SessionId {
        &self.state.session_id
    }

    /// The cached session list.
    pub fn sessions(&self) -> &[SessionInfo] {
        self.cache.sessions()
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True if replies are streamed.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn ensure_idle(&self, operation: &str) -> Result<()> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Sending => Err(Error::invalid_state(format!(
                "cannot {operation} while a message is being sent"
            ))),
        }
    }

    /// Adopts the server's view of the session.
    fn apply(&mut self, state: ChatState) {
        self.state.messages = state.messages;
        self.state.model = state.model;
    }

    /// Returns to `Idle` after a send, whether it completed, failed, or was dropped.
    fn finish_send(&mut self) {
        self.state.streaming_message.clear();
        self.state.is_processing = false;
        self.phase = Phase::Idle;
    }

    /// Starts an empty conversation under a new id, keeping the selected model.
    fn reset_to_fresh_session(&mut self) {
        let id = self.ids.new_id();
        let model = self.state.model.clone();
        self.state = ChatState::new(id, model);
    }

    /// Sends `text` as the user's next message.
    ///
    /// Whitespace-only input is ignored and returns `Ok(None)`.  Every failure along the way is
    /// reported through `renderer`; failures of the send itself are also returned.  Whatever
    /// happens, the store finishes in [`Phase::Idle`] with `is_processing` cleared and the
    /// message log reloaded from the server when possible.
    pub async fn submit(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<&ChatState>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.ensure_idle("send a message")?;
        STORE_SENDS.click();
        let mut store = SendGuard::begin(self);

        let session = store.state.session_id.clone();
        store.state.messages.push(Message::user(text, now_millis()));

        if !store.cache.contains(&session) {
            store.register_session(&session, text, renderer).await;
        }

        let result = if store.streaming {
            store.stream_reply(&session, text, renderer).await
        } else {
            store.whole_reply(&session, text, renderer).await
        };
        match &result {
            Ok(()) => {}
            Err(e) if e.is_abort() => renderer.print_interrupted(),
            Err(e) => {
                STORE_SEND_ERRORS.click();
                renderer.print_error(e.message());
            }
        }

        if store.streaming || result.is_err() {
            let reloaded = store.api.get_messages(&session).await;
            match reloaded {
                Ok(state) => store.apply(state),
                Err(e) => {
                    STORE_RELOAD_ERRORS.click();
                    renderer.print_error(e.message());
                }
            }
        }
        drop(store);

        result?;
        Ok(Some(&self.state))
    }

    /// Registers the active session so it shows up in the session list.
    ///
    /// Failure is reported and otherwise ignored; the message is still sent.
    async fn register_session(
        &mut self,
        session: &SessionId,
        first_message: &str,
        renderer: &mut dyn Renderer,
    ) {
        let title = generate_session_title(first_message, OffsetDateTime::now_utc());
        let request = NewSession::new()
            .with_title(title)
            .with_session_id(session.clone())
            .with_first_message(first_message);
        if let Err(e) = self.cache.create(&self.api, request).await {
            renderer.print_error(e.message());
            return;
        }
        if let Err(e) = self.cache.refresh(&self.api).await {
            renderer.print_error(e.message());
        }
    }

    async fn stream_reply(
        &mut self,
        session: &SessionId,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let model = self.state.model.clone();
        renderer.start_response();
        let mut assembler = StreamAssembler::new(&mut self.state.streaming_message);
        let mut on_chunk = |chunk: &str| {
            assembler.push(chunk);
            renderer.print_text(chunk);
            if renderer.should_interrupt() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let result = self
            .api
            .stream_message(session, text, Some(&model), &mut on_chunk)
            .await;
        if result.is_ok() {
            renderer.finish_response();
        }
        result
    }

    async fn whole_reply(
        &mut self,
        session: &SessionId,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let request = ChatRequest::new(text, Some(self.state.model.clone()));
        let state = self.api.send_message(session, request).await?;
        if let Some(reply) = state
            .messages
            .last()
            .filter(|m| m.role == MessageRole::Assistant)
        {
            renderer.start_response();
            renderer.print_text(&reply.content);
            renderer.finish_response();
            for call in &reply.tool_calls {
                renderer.print_tool_call(call);
            }
        }
        self.apply(state);
        Ok(())
    }

    /// Fetches the active session's messages.
    pub async fn reload(&mut self) -> Result<&ChatState> {
        self.ensure_idle("reload")?;
        let state = self.api.get_messages(&self.state.session_id).await?;
        self.apply(state);
        Ok(&self.state)
    }

    /// Replaces the cached session list with the server's.
    pub async fn refresh_sessions(&mut self) -> Result<&[SessionInfo]> {
        self.cache.refresh(&self.api).await
    }

    /// Makes `id` the active session and loads its messages.
    ///
    /// Switching to the active session does nothing.
    pub async fn switch_session(&mut self, id: SessionId) -> Result<&ChatState> {
        self.ensure_idle("switch sessions")?;
        if id == self.state.session_id {
            return Ok(&self.state);
        }
        self.ids.switch_to(id.clone());
        let model = self.state.model.clone();
        self.state = ChatState::new(id, model);
        self.reload().await
    }

    /// Starts a new, empty session and refreshes the session list.
    pub async fn new_session(&mut self) -> Result<&SessionId> {
        self.ensure_idle("start a new session")?;
        self.reset_to_fresh_session();
        self.cache.refresh(&self.api).await?;
        Ok(&self.state.session_id)
    }

    /// Renames a session.  A blank title is ignored and returns `Ok(false)`.
    pub async fn rename_session(&mut self, id: &SessionId, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }
        self.cache.rename(&self.api, id, title).await?;
        self.cache.refresh(&self.api).await?;
        Ok(true)
    }

    /// Deletes a session.  Deleting the active session starts a new one.
    pub async fn delete_session(&mut self, id: &SessionId) -> Result<()> {
        let active = *id == self.state.session_id;
        if active {
            self.ensure_idle("delete the active session")?;
        }
        self.cache.delete(&self.api, id).await?;
        if active {
            self.reset_to_fresh_session();
        }
        self.cache.refresh(&self.api).await?;
        Ok(())
    }

    /// Deletes every session and starts a new one, returning how many were deleted.
    pub async fn clear_all_sessions(&mut self) -> Result<usize> {
        self.ensure_idle("clear all sessions")?;
        let count = self.cache.clear_all(&self.api).await?;
        self.reset_to_fresh_session();
        self.cache.refresh(&self.api).await?;
        Ok(count)
    }

    /// Clears the active session's messages.
    pub async fn clear_messages(&mut self) -> Result<&ChatState> {
        self.ensure_idle("clear messages")?;
        let state = self.api.clear_messages(&self.state.session_id).await?;
        self.apply(state);
        Ok(&self.state)
    }

    /// Selects the model used for the active session.
    pub async fn change_model(&mut self, model: Model) -> Result<&ChatState> {
        self.ensure_idle("change models")?;
        let state = self
            .api
            .update_model(&self.state.session_id, &model)
            .await?;
        self.apply(state);
        Ok(&self.state)
    }
}

/// Holds a store in [`Phase::Sending`] and returns it to `Idle` when dropped.
///
/// Dropping a `submit` future part way (a timeout, a `select!`) drops the guard too, so the
/// store never stays stuck in `Sending`.
struct SendGuard<'a, A: ChatApi> {
    store: &'a mut ChatStore<A>,
}

impl<'a, A: ChatApi> SendGuard<'a, A> {
    fn begin(store: &'a mut ChatStore<A>) -> Self {
        store.phase = Phase::Sending;
        store.state.streaming_message.clear();
        store.state.is_processing = true;
        Self { store }
    }
}

impl<A: ChatApi> Deref for SendGuard<'_, A> {
    type Target = ChatStore<A>;

    fn deref(&self) -> &ChatStore<A> {
        self.store
    }
}

impl<A: ChatApi> DerefMut for SendGuard<'_, A> {
    fn deref_mut(&mut self) -> &mut ChatStore<A> {
        self.store
    }
}

impl<A: ChatApi> Drop for SendGuard<'_, A> {
    fn drop(&mut self) {
        self.store.finish_send();
    }
}
