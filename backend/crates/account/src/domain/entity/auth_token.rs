//! Auth Token Entity
//!
//! At most one per user. Issuing a new token replaces the previous row, so
//! the old key stops resolving immediately.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    token_key::{TokenDigest, TokenKey},
    user_id::UserId,
};

/// Persisted token record (digest only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Owning user
    pub user_id: UserId,
    /// SHA-256 of the plaintext key
    pub digest: TokenDigest,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Create a record for a freshly generated key
    pub fn new(user_id: UserId, key: &TokenKey) -> Self {
        Self {
            user_id,
            digest: key.digest(),
            created_at: Utc::now(),
        }
    }
}
