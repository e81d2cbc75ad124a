//! Auth Extractors
//!
//! Resolve the `Authorization` header to a user for protected routes.
//! Both `Bearer <token>` and `Token <token>` are accepted; the scheme is
//! case-insensitive.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};

use crate::domain::entity::user::User;
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::error::AccountError;
use crate::presentation::handlers::AccountAppState;

const AUTH_SCHEMES: [&str; 2] = ["Bearer", "Token"];

/// Extract the token from an `Authorization` header
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !AUTH_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticated, active user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<R> FromRequestParts<AccountAppState<R>> for CurrentUser
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    type Rejection = AccountError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AccountAppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(|| {
            tracing::debug!("Missing or malformed Authorization header");
            AccountError::Unauthenticated
        })?;

        let user = state.token_service().resolve_token(token).await?;
        Ok(CurrentUser(user))
    }
}

/// Authenticated user with `is_staff`
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl<R> FromRequestParts<AccountAppState<R>> for StaffUser
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    type Rejection = AccountError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AccountAppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_staff {
            return Err(AccountError::Forbidden);
        }

        Ok(StaffUser(user))
    }
}
