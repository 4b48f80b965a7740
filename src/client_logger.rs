//! Logging trait for chat client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`ChatClient`](crate::ChatClient).

use crate::{ChatState, SessionId};

/// A trait for logging chat client operations.
///
/// Implement this trait to capture and record every interaction with the chat API,
/// including full `ChatState` responses and individual streamed text chunks.
///
/// # Example
///
/// ```rust,ignore
/// use aethermind::{ChatState, ClientLogger, SessionId};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_response(&self, session: &SessionId, state: &ChatState) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{session}: {}", serde_json::to_string(state).unwrap()).unwrap();
///     }
///
///     fn log_chunk(&self, session: &SessionId, chunk: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{session} chunk: {chunk:?}").unwrap();
///     }
///
///     fn log_stream_complete(&self, session: &SessionId, text: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{session} complete: {} bytes", text.len()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a `ChatState` returned by a session-scoped request.
    ///
    /// Called for non-streaming sends, message reloads, clears, and model changes.
    fn log_response(&self, session: &SessionId, state: &ChatState);

    /// Log an individual decoded chunk of a streamed response.
    ///
    /// Chunks arrive in receive order and are never empty.
    fn log_chunk(&self, session: &SessionId, chunk: &str);

    /// Log the concatenated text of a stream that ran to completion.
    ///
    /// Not called for streams that fail or are abandoned.
    fn log_stream_complete(&self, session: &SessionId, text: &str);
}
