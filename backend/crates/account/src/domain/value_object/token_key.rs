//! Auth Token Key
//!
//! The plaintext key is handed to the client once and never stored. The
//! repository only sees its SHA-256 digest.

use platform::crypto;
use std::fmt;

/// Upper bound for a presented key; anything longer is rejected unhashed
const TOKEN_KEY_MAX_LENGTH: usize = 256;

/// Plaintext token key (URL-safe base64)
#[derive(Clone, PartialEq, Eq)]
pub struct TokenKey(String);

impl TokenKey {
    /// Generate a fresh key from `byte_len` random bytes
    pub fn generate(byte_len: usize) -> Self {
        Self(crypto::random_token(byte_len))
    }

    /// Accept a key presented by a client
    ///
    /// Returns `None` for values that could never have been issued.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > TOKEN_KEY_MAX_LENGTH {
            return None;
        }
        crypto::from_base64_url(raw).ok()?;
        Some(Self(raw.to_string()))
    }

    pub fn digest(&self) -> TokenDigest {
        TokenDigest(crypto::sha256(self.0.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenKey").field(&"[REDACTED]").finish()
    }
}

/// SHA-256 digest of a token key, the persisted form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Restore from a database column; `None` on length mismatch
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    /// Compare without early exit
    pub fn matches(&self, other: &TokenDigest) -> bool {
        crypto::constant_time_eq(&self.0, &other.0)
    }
}
