//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use crate::domain::entity::{auth_token::AuthToken, user::User};
use crate::domain::value_object::{email::Email, token_key::TokenDigest, user_id::UserId};
use crate::error::AccountResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user
    ///
    /// Uniqueness of the email is checked atomically with the insert;
    /// a duplicate yields `AccountError::EmailTaken`.
    async fn create(&self, user: &User) -> AccountResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> AccountResult<Option<User>>;

    /// Check if email is registered
    async fn exists_by_email(&self, email: &Email) -> AccountResult<bool>;

    /// Persist name, password and flags
    async fn update(&self, user: &User) -> AccountResult<()>;

    /// All users ordered by email
    async fn list(&self) -> AccountResult<Vec<User>>;
}

/// Auth token repository trait
#[trait_variant::make(AuthTokenRepository: Send)]
pub trait LocalAuthTokenRepository {
    /// Store the token and stamp the login in one atomic write
    ///
    /// Replaces any existing token of the same user and sets the user's
    /// `last_login_at` to the token's `created_at`. On error nothing is
    /// changed, so the previous token stays valid.
    async fn replace_for_login(&self, token: &AuthToken) -> AccountResult<()>;

    /// Find token by digest
    async fn find_by_digest(&self, digest: &TokenDigest) -> AccountResult<Option<AuthToken>>;
}
