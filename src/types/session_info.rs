use serde::{Deserialize, Serialize};

use crate::SessionId;

/// An entry in the remote session directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Session identity.
    pub id: SessionId,

    /// Mutable display title.
    pub title: String,

    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,

    /// Last activity in milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_active: i64,
}

/// Request body for `POST /api/sessions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    /// Title for the session; the server picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Identifier to register; the server allocates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// First user message of the conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
}

impl NewSession {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the session id to register.
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Sets the first message.
    pub fn with_first_message(mut self, first_message: impl Into<String>) -> Self {
        self.first_message = Some(first_message.into());
        self
    }
}

/// Response data for `POST /api/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    /// The registered session id.
    pub session_id: SessionId,
    /// The title the server stored.
    pub title: String,
}

/// Response data for `DELETE /api/sessions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedSessions {
    /// Number of sessions removed.
    pub deleted_count: usize,
}
