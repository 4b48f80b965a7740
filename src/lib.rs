//! Client core for the AetherMind research-assistant chat service.
//!
//! [`ChatClient`] speaks the HTTP API, [`ChatStore`] keeps the active conversation and the
//! session list consistent with the server, and [`Renderer`] is where results and
//! notifications surface.  The [`chat`] module builds a terminal client on top.

// Public modules
pub mod assembler;
pub mod auth;
pub mod chat;
pub mod chunk_stream;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod session_cache;
pub mod session_id;
pub mod store;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-exports
pub use assembler::StreamAssembler;
pub use auth::{Authenticator, FileStore, KeyValueStore, MemoryStore, User};
pub use chunk_stream::{Utf8ChunkDecoder, process_chunks};
pub use client::{ChatApi, ChatClient, ChunkHandler, SessionClient};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use session_cache::SessionListCache;
pub use session_id::{SessionId, SessionIdAllocator};
pub use store::{ChatStore, Phase};
pub use types::*;
