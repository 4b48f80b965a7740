// Public modules
pub mod api_response;
pub mod chat_request;
pub mod chat_state;
pub mod message;
pub mod model;
pub mod session_info;
pub mod tool_call;

// Re-exports
pub use api_response::ApiResponse;
pub use chat_request::ChatRequest;
pub(crate) use chat_request::{ModelUpdate, TitleUpdate};
pub use chat_state::ChatState;
pub use message::{Message, MessageRole};
pub use model::{KnownModel, Model};
pub use session_info::{ClearedSessions, CreatedSession, NewSession, SessionInfo};
pub use tool_call::{DataQueryReport, ToolCall, ToolContent, ToolResult, WeatherReport};
