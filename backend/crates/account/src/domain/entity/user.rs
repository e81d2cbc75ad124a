//! User Entity
//!
//! An account identified by its email. The password is only ever held as an
//! Argon2id hash.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_password::UserPassword,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Unique, lower-cased login identifier
    pub email: Email,
    /// Display name, empty when not provided
    pub name: DisplayName,
    pub password: UserPassword,
    /// Inactive users cannot obtain or use tokens
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Last successful token issuance
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a regular, active user
    pub fn new(email: Email, name: DisplayName, password: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            name,
            password,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a user with staff and superuser flags set
    pub fn new_superuser(email: Email, password: UserPassword) -> Self {
        let mut user = Self::new(email, DisplayName::default(), password);
        user.is_staff = true;
        user.is_superuser = true;
        user
    }

    /// Record successful login
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }

    /// Check if user can authenticate
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn set_name(&mut self, name: DisplayName) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    pub fn set_password(&mut self, password: UserPassword) {
        self.password = password;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}
