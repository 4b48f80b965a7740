use serde::{Deserialize, Serialize};

use crate::types::ToolCall;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The human side of the conversation.
    User,
    /// The research assistant.
    Assistant,
}

/// A single entry in a session's message log.
///
/// Messages are immutable once appended.  Insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message token.
    pub id: String,

    /// Author of the message.
    pub role: MessageRole,

    /// Message text.
    pub content: String,

    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// Tools the assistant invoked while producing this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Creates a locally-synthesized user message with a fresh id.
    pub fn user(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp,
            tool_calls: Vec::new(),
        }
    }

    /// Returns true if the user authored this message.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
