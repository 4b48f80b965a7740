//! Session identifiers and their allocation.
//!
//! Every chat operation is scoped to a [`SessionId`].  The [`SessionIdAllocator`] hands out
//! fresh identifiers and tracks which one is active; it never talks to the network.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, unique session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Allocates session identifiers and remembers the active one.
///
/// Identifiers handed out by [`new_id`](Self::new_id) are never repeated over the lifetime of
/// the allocator, even in the astronomically unlikely case of a random collision.
#[derive(Debug, Clone)]
pub struct SessionIdAllocator {
    current: SessionId,
    issued: HashSet<SessionId>,
}

impl SessionIdAllocator {
    /// Creates an allocator whose current id is freshly generated.
    pub fn new() -> Self {
        let current = SessionId::generate();
        let mut issued = HashSet::new();
        issued.insert(current.clone());
        Self { current, issued }
    }

    /// Allocates a never-before-issued id and makes it current.
    pub fn new_id(&mut self) -> SessionId {
        let mut id = SessionId::generate();
        while self.issued.contains(&id) {
            id = SessionId::generate();
        }
        self.issued.insert(id.clone());
        self.current = id.clone();
        id
    }

    /// Returns the active session id.
    pub fn current(&self) -> &SessionId {
        &self.current
    }

    /// Makes `id` the active session without allocating.
    pub fn switch_to(&mut self, id: SessionId) {
        self.issued.insert(id.clone());
        self.current = id;
    }
}

impl Default for SessionIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
