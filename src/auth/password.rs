//! Salted password hashing and session token generation.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored password: a random salt and the SHA-256 of salt and password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordHash {
    /// Base64 salt.
    pub salt: String,
    /// Base64 digest.
    pub hashed_password: String,
}

impl PasswordHash {
    /// Hashes `password` under a fresh salt.
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::rng().fill(&mut salt);
        let salt = STANDARD.encode(salt);
        let hashed_password = digest(&salt, password);
        Self {
            salt,
            hashed_password,
        }
    }

    /// True if `password` hashes to the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest(&self.salt, password);
        constant_time_eq(candidate.as_bytes(), self.hashed_password.as_bytes())
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Generates an opaque session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
