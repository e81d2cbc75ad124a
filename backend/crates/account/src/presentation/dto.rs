//! API DTOs (Data Transfer Objects)
//!
//! Request fields are optional so that a missing field becomes a per-field
//! error instead of a body rejection.

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// Create Account
// ============================================================================

/// Create account request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

// ============================================================================
// Obtain Token
// ============================================================================

/// Token request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Profile
// ============================================================================

/// Profile update request, absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user (create and profile responses)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_string(),
            name: user.name.to_string(),
        }
    }
}

// ============================================================================
// Admin
// ============================================================================

/// Staff request to add a user
///
/// Flags default to an active, non-staff account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminCreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// Staff view of a user
///
/// Timestamps are Unix milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login_at: Option<i64>,
    pub created_at: i64,
}

impl From<&User> for AdminUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            email: user.email.to_string(),
            name: user.name.to_string(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            last_login_at: user.last_login_at.map(|t| t.timestamp_millis()),
            created_at: user.created_at.timestamp_millis(),
        }
    }
}
