use serde::{Deserialize, Serialize};

use crate::types::Model;

/// Request body for `POST /api/chat/{sessionId}/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,

    /// Model override for this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,

    /// Whether the reply should be streamed as chunked text.
    pub stream: bool,
}

impl ChatRequest {
    /// Creates a non-streaming request.
    pub fn new(message: impl Into<String>, model: Option<Model>) -> Self {
        Self {
            message: message.into(),
            model,
            stream: false,
        }
    }

    /// Creates a streaming request.
    pub fn streaming(message: impl Into<String>, model: Option<Model>) -> Self {
        Self {
            stream: true,
            ..Self::new(message, model)
        }
    }
}

/// Request body for `POST /api/chat/{sessionId}/model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ModelUpdate {
    pub model: Model,
}

/// Request body for `PUT /api/sessions/{id}/title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TitleUpdate {
    pub title: String,
}
