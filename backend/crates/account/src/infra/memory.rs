//! In-Memory Repository Implementation
//!
//! Used by tests and when the server runs without `DATABASE_URL`. Every
//! operation takes the single state lock, so check-then-insert is atomic.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entity::{auth_token::AuthToken, user::User};
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, token_key::TokenDigest, user_id::UserId};
use crate::error::{AccountError, AccountResult};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    user_ids_by_email: HashMap<Email, UserId>,
    /// One token per user
    tokens: HashMap<UserId, AuthToken>,
    user_ids_by_digest: HashMap<TokenDigest, UserId>,
}

/// In-memory account repository
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn token_count(&self) -> usize {
        self.state.read().await.tokens.len()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for InMemoryAccountRepository {
    async fn create(&self, user: &User) -> AccountResult<()> {
        let mut state = self.state.write().await;

        if state.user_ids_by_email.contains_key(&user.email) {
            return Err(AccountError::EmailTaken);
        }

        state
            .user_ids_by_email
            .insert(user.email.clone(), user.user_id);
        state.users.insert(user.user_id, user.clone());

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AccountResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .user_ids_by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AccountResult<bool> {
        Ok(self.state.read().await.user_ids_by_email.contains_key(email))
    }

    async fn update(&self, user: &User) -> AccountResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get_mut(&user.user_id)
            .ok_or(AccountError::UserNotFound)?;

        // email and last_login_at are not part of a profile update
        stored.name = user.name.clone();
        stored.password = user.password.clone();
        stored.is_active = user.is_active;
        stored.is_staff = user.is_staff;
        stored.is_superuser = user.is_superuser;
        stored.updated_at = user.updated_at;

        Ok(())
    }

    async fn list(&self) -> AccountResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}

// ============================================================================
// Auth Token Repository Implementation
// ============================================================================

impl AuthTokenRepository for InMemoryAccountRepository {
    async fn replace_for_login(&self, token: &AuthToken) -> AccountResult<()> {
        let mut state = self.state.write().await;

        state
            .users
            .get_mut(&token.user_id)
            .ok_or(AccountError::UserNotFound)?
            .record_login(token.created_at);

        if let Some(previous) = state.tokens.insert(token.user_id, token.clone()) {
            state.user_ids_by_digest.remove(&previous.digest);
        }
        state.user_ids_by_digest.insert(token.digest, token.user_id);

        Ok(())
    }

    async fn find_by_digest(&self, digest: &TokenDigest) -> AccountResult<Option<AuthToken>> {
        let state = self.state.read().await;
        Ok(state
            .user_ids_by_digest
            .get(digest)
            .and_then(|id| state.tokens.get(id))
            .filter(|token| token.digest.matches(digest))
            .cloned())
    }
}
