//! Auth Token Service
//!
//! Issues opaque bearer tokens and resolves them back to their user.
//! One token per user; issuing replaces the previous one. Tokens do not
//! expire.

use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::entity::{auth_token::AuthToken, user::User};
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::value_object::token_key::TokenKey;
use crate::error::{AccountError, AccountResult};

/// Token service
pub struct TokenService<R>
where
    R: UserRepository + AuthTokenRepository,
{
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> TokenService<R>
where
    R: UserRepository + AuthTokenRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    /// Issue a fresh token for an authenticated user
    ///
    /// The returned key is the only copy of the plaintext.
    pub async fn issue_token(&self, user: &User) -> AccountResult<TokenKey> {
        let key = TokenKey::generate(self.config.token_bytes_len);
        let token = AuthToken::new(user.user_id, &key);

        self.repo.replace_for_login(&token).await?;

        tracing::info!(user_id = %user.user_id, "Token issued");

        Ok(key)
    }

    /// Resolve a presented key to its active owner
    pub async fn resolve_token(&self, raw: &str) -> AccountResult<User> {
        let key = TokenKey::parse(raw).ok_or(AccountError::Unauthenticated)?;

        let token = self
            .repo
            .find_by_digest(&key.digest())
            .await?
            .ok_or(AccountError::Unauthenticated)?;

        let user = self
            .repo
            .find_by_id(&token.user_id)
            .await?
            .ok_or(AccountError::Unauthenticated)?;

        if !user.can_login() {
            tracing::debug!(user_id = %user.user_id, "Token presented for inactive account");
            return Err(AccountError::Unauthenticated);
        }

        Ok(user)
    }
}
