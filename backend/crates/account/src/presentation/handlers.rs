//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::error::field::FieldErrors;
use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::application::{
    AccountFlags, CreateUserInput, TokenService, UpdateProfileInput, UserStore,
};
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AccountError, AccountResult};
use crate::presentation::dto::{
    AdminCreateUserRequest, AdminUserResponse, CreateUserRequest, TokenRequest, TokenResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::presentation::middleware::{CurrentUser, StaffUser};

/// Shared state for account handlers
#[derive(Clone)]
pub struct AccountAppState<R>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AccountConfig>,
}

impl<R> AccountAppState<R>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AccountConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }

    pub fn user_store(&self) -> UserStore<R> {
        UserStore::new(self.repo.clone(), self.config.clone())
    }

    pub fn token_service(&self) -> TokenService<R> {
        TokenService::new(self.repo.clone(), self.config.clone())
    }
}

// ============================================================================
// Create Account
// ============================================================================

/// POST /api/users/create
pub async fn create_user<R>(
    State(state): State<AccountAppState<R>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AccountResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let input = CreateUserInput {
        email: req.email,
        password: req.password,
        name: req.name,
        flags: AccountFlags::default(),
    };

    let user = state.user_store().create_user(input).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Obtain Token
// ============================================================================

/// Reject absent or blank credential fields before any lookup
fn require_credential(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.add(field, "This field is required.");
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, "This field may not be blank.");
            None
        }
        Some(v) => Some(v),
    }
}

/// POST /api/users/token
pub async fn obtain_token<R>(
    State(state): State<AccountAppState<R>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> AccountResult<Json<TokenResponse>>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let email = require_credential(&mut errors, "email", req.email);
    let password = require_credential(&mut errors, "password", req.password);
    errors.into_result().map_err(AccountError::Validation)?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AccountError::Internal(
            "credentials missing after validation".to_string(),
        ));
    };

    let user = state
        .user_store()
        .verify_credentials(&email, password)
        .await?;
    let key = state.token_service().issue_token(&user).await?;

    Ok(Json(TokenResponse {
        token: key.into_string(),
    }))
}

// ============================================================================
// Profile (requires authentication)
// ============================================================================

/// GET /api/users/update
pub async fn retrieve_profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// PATCH /api/users/update
pub async fn update_profile<R>(
    State(state): State<AccountAppState<R>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AccountResult<Json<UserResponse>>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let input = UpdateProfileInput {
        name: req.name,
        password: req.password,
    };

    let updated = state
        .user_store()
        .update_profile(&user.user_id, input)
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

// ============================================================================
// Admin (requires staff)
// ============================================================================

/// GET /api/admin/users
pub async fn list_users<R>(
    State(state): State<AccountAppState<R>>,
    StaffUser(_staff): StaffUser,
) -> AccountResult<Json<Vec<AdminUserResponse>>>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let users = state.user_store().list_users().await?;
    Ok(Json(users.iter().map(AdminUserResponse::from).collect()))
}

/// POST /api/admin/users
///
/// Only a superuser may create another superuser.
pub async fn admin_create_user<R>(
    State(state): State<AccountAppState<R>>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<AdminCreateUserRequest>, JsonRejection>,
) -> AccountResult<(StatusCode, Json<AdminUserResponse>)>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let flags = AccountFlags {
        is_active: req.is_active.unwrap_or(true),
        is_staff: req.is_staff.unwrap_or(false),
        is_superuser: req.is_superuser.unwrap_or(false),
    };
    if flags.is_superuser && !staff.is_superuser {
        return Err(AccountError::Forbidden);
    }

    let input = CreateUserInput {
        email: req.email,
        password: req.password,
        name: req.name,
        flags,
    };

    let user = state.user_store().create_user(input).await?;

    tracing::info!(
        created_by = %staff.user_id,
        user_id = %user.user_id,
        is_staff = user.is_staff,
        is_superuser = user.is_superuser,
        "User added by staff"
    );

    Ok((StatusCode::CREATED, Json(AdminUserResponse::from(&user))))
}

/// GET /api/admin/users/{user_id}
pub async fn get_user<R>(
    State(state): State<AccountAppState<R>>,
    StaffUser(_staff): StaffUser,
    Path(user_id): Path<String>,
) -> AccountResult<Json<AdminUserResponse>>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let user_id: UserId = user_id.parse().map_err(|_| AccountError::UserNotFound)?;
    let user = state.user_store().get_by_id(&user_id).await?;
    Ok(Json(AdminUserResponse::from(&user)))
}
