//! Client-side mirror of the server's session directory.

use crate::client::ChatApi;
use crate::error::Result;
use crate::session_id::SessionId;
use crate::types::{CreatedSession, NewSession, SessionInfo};

/// A cached copy of the session list.
///
/// The cache is only ever replaced wholesale by [`refresh`](Self::refresh); mutating calls go
/// to the server and leave the cache untouched, so a failed call never corrupts it.  Callers
/// refresh after a successful mutation.
#[derive(Debug, Clone, Default)]
pub struct SessionListCache {
    sessions: Vec<SessionInfo>,
}

impl SessionListCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached sessions in server order.
    pub fn sessions(&self) -> &[SessionInfo] {
        &self.sessions
    }

    /// True if `id` is in the cached list.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.get(id).is_some()
    }

    /// Looks up a cached session.
    pub fn get(&self, id: &SessionId) -> Option<&SessionInfo> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Number of cached sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True if the cache holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Replaces the cached list with the server's.
    ///
    /// On error the previous list is kept.
    pub async fn refresh<A: ChatApi + ?Sized>(&mut self, api: &A) -> Result<&[SessionInfo]> {
        self.sessions = api.list_sessions().await?;
        Ok(&self.sessions)
    }

    /// Registers a session with the server.
    pub async fn create<A: ChatApi + ?Sized>(
        &self,
        api: &A,
        request: NewSession,
    ) -> Result<CreatedSession> {
        api.create_session(request).await
    }

    /// Renames a session on the server.
    pub async fn rename<A: ChatApi + ?Sized>(
        &self,
        api: &A,
        id: &SessionId,
        title: &str,
    ) -> Result<()> {
        api.update_session_title(id, title).await
    }

    /// Deletes a session on the server.
    pub async fn delete<A: ChatApi + ?Sized>(&self, api: &A, id: &SessionId) -> Result<()> {
        api.delete_session(id).await
    }

    /// Deletes every session on the server.
    pub async fn clear_all<A: ChatApi + ?Sized>(&self, api: &A) -> Result<usize> {
        api.clear_all_sessions().await
    }
}
