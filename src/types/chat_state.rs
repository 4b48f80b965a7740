use serde::{Deserialize, Serialize};

use crate::SessionId;
use crate::types::{Message, Model};

/// The working set for one active session.
///
/// This is both the body the server returns for session-scoped requests and the in-memory
/// record the view layer renders from.  `streaming_message` is non-empty only while a streamed
/// response is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    /// Session the state belongs to.
    pub session_id: SessionId,

    /// Ordered message log.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// True while a send is outstanding.
    #[serde(default)]
    pub is_processing: bool,

    /// Model selected for this session.
    #[serde(default)]
    pub model: Model,

    /// Text accumulated so far from an in-flight streamed response.
    #[serde(default)]
    pub streaming_message: String,
}

impl ChatState {
    /// Creates an empty, idle state for `session_id`.
    pub fn new(session_id: SessionId, model: Model) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
            is_processing: false,
            model,
            streaming_message: String::new(),
        }
    }

    /// True when there is nothing to show: no messages, no partial text, no send in flight.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.streaming_message.is_empty() && !self.is_processing
    }
}
