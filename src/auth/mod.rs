//! Local authentication gate.
//!
//! Users and the current login live in a [`KeyValueStore`].  Passwords are stored salted and
//! hashed; the login is an opaque random token with an expiry, recorded next to the username.
//! This gates the terminal client and is not a security boundary for the chat API.

mod password;
mod storage;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observability::{AUTH_LOGIN_FAILURES, AUTH_LOGINS};
use crate::utils::now_millis;

pub use password::{PasswordHash, generate_token};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Key under which registered users are stored.
pub const USERS_KEY: &str = "aethermind_users";

/// Key under which the current login is stored.
pub const SESSION_KEY: &str = "aethermind_session";

/// How long a login stays valid.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const USER_EXISTS: &str = "User already exists.";
const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// A logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's name.
    pub username: String,
}

/// The persisted login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque random token.
    pub token: String,
    /// Who logged in.
    pub username: String,
    /// Expiry in milliseconds since the Unix epoch.
    pub expires: i64,
}

/// Signup, login, and logout against a [`KeyValueStore`].
pub struct Authenticator<S: KeyValueStore> {
    store: S,
    ttl: Duration,
    clock: fn() -> i64,
}

impl<S: KeyValueStore> Authenticator<S> {
    /// Creates an authenticator over `store` with the default session lifetime.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ttl: SESSION_TTL,
            clock: now_millis,
        }
    }

    /// Overrides the session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the clock, in epoch milliseconds.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a user.  Fails if the name is taken.
    pub fn signup(&self, username: &str, password: &str) -> Result<()> {
        validate(username, password)?;
        let mut users = self.users()?;
        if users.contains_key(username) {
            return Err(Error::authentication(USER_EXISTS));
        }
        users.insert(username.to_string(), PasswordHash::new(password));
        self.store.set(USERS_KEY, &serde_json::to_string(&users)?)
    }

    /// Verifies credentials and records a new login.
    ///
    /// Unknown users and wrong passwords fail with the same message.
    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        validate(username, password)?;
        let users = self.users()?;
        let verified = users
            .get(username)
            .is_some_and(|hash| hash.verify(password));
        if !verified {
            AUTH_LOGIN_FAILURES.click();
            return Err(Error::authentication(INVALID_CREDENTIALS));
        }
        let session = AuthSession {
            token: generate_token(),
            username: username.to_string(),
            expires: (self.clock)().saturating_add(self.ttl.as_millis() as i64),
        };
        self.store
            .set(SESSION_KEY, &serde_json::to_string(&session)?)?;
        AUTH_LOGINS.click();
        Ok(User {
            username: session.username,
        })
    }

    /// Forgets the current login.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }

    /// The logged-in user, if the login exists and has not expired.
    ///
    /// Expired or unreadable logins are removed.
    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self.current_session()?.map(|session| User {
            username: session.username,
        }))
    }

    /// The persisted login, if still valid.
    pub fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) if session.expires >= (self.clock)() => Ok(Some(session)),
            _ => {
                self.logout()?;
                Ok(None)
            }
        }
    }

    /// Registered users.  An unreadable record counts as no users.
    fn users(&self) -> Result<HashMap<String, PasswordHash>> {
        Ok(self
            .store
            .get(USERS_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }
}

fn validate(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::validation(
            "username must not be empty",
            Some("username".to_string()),
        ));
    }
    if password.is_empty() {
        return Err(Error::validation(
            "password must not be empty",
            Some("password".to_string()),
        ));
    }
    Ok(())
}
