//! User Store
//!
//! Account creation, credential verification and profile updates. Every
//! input field is validated before anything is persisted, and all failing
//! fields are reported together.

use std::sync::{Arc, OnceLock};

use kernel::error::{app_error::AppResult, field::FieldErrors};

use crate::application::config::AccountConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AccountError, AccountResult, EMAIL_TAKEN_MESSAGE};

const REQUIRED_MESSAGE: &str = "This field is required.";

/// Hash checked when the email is unknown, so a miss costs one Argon2
/// verification like a wrong password does
static DUMMY_PASSWORD: OnceLock<Option<UserPassword>> = OnceLock::new();

fn dummy_password() -> Option<&'static UserPassword> {
    DUMMY_PASSWORD
        .get_or_init(|| {
            let raw = RawPassword::new("dummy-password-for-timing".to_string()).ok()?;
            UserPassword::from_raw(&raw, None).ok()
        })
        .as_ref()
}

/// Account flags applied at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFlags {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for AccountFlags {
    fn default() -> Self {
        Self {
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Create user input
///
/// Fields are optional so that a missing field is reported per field rather
/// than as a malformed body. Public registration leaves `flags` at default.
#[derive(Debug, Default)]
pub struct CreateUserInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub flags: AccountFlags,
}

/// Profile update input, `None` leaves the field unchanged
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Record the error of `result` under `field` and turn it into an `Option`
fn collect<T>(errors: &mut FieldErrors, field: &str, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.add(field, e.message());
            None
        }
    }
}

fn collect_name(errors: &mut FieldErrors, raw: &str) -> Option<DisplayName> {
    match DisplayName::new(raw) {
        Ok(name) => Some(name),
        Err(e) => {
            errors.add("name", e.to_string());
            None
        }
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    if value.is_none() {
        errors.add(field, REQUIRED_MESSAGE);
    }
    value
}

/// User store
pub struct UserStore<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> UserStore<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    /// Register a user
    pub async fn create_user(&self, input: CreateUserInput) -> AccountResult<User> {
        let mut errors = FieldErrors::new();

        let email = required(&mut errors, "email", input.email)
            .and_then(|raw| collect(&mut errors, "email", Email::new(raw)));
        let password = required(&mut errors, "password", input.password)
            .and_then(|raw| collect(&mut errors, "password", RawPassword::new(raw)));
        let name = collect_name(&mut errors, input.name.as_deref().unwrap_or_default());

        if let Some(email) = &email {
            if self.repo.exists_by_email(email).await? {
                errors.add("email", EMAIL_TAKEN_MESSAGE);
            }
        }

        errors.into_result().map_err(AccountError::Validation)?;
        let (Some(email), Some(password), Some(name)) = (email, password, name) else {
            return Err(AccountError::Internal(
                "validated fields missing after validation".to_string(),
            ));
        };

        let password = UserPassword::from_raw(&password, self.config.pepper())?;
        let mut user = User::new(email, name, password);
        user.is_staff = input.flags.is_staff;
        user.is_superuser = input.flags.is_superuser;
        if !input.flags.is_active {
            user.deactivate();
        }

        // The existence check above is advisory; the repository insert is
        // the atomic uniqueness check.
        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User created"
        );

        Ok(user)
    }

    /// Register a staff superuser
    pub async fn create_superuser(&self, email: &str, password: String) -> AccountResult<User> {
        let mut errors = FieldErrors::new();
        let email = collect(&mut errors, "email", Email::new(email));
        let password = collect(&mut errors, "password", RawPassword::new(password));
        errors.into_result().map_err(AccountError::Validation)?;
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AccountError::Internal(
                "validated fields missing after validation".to_string(),
            ));
        };

        let password = UserPassword::from_raw(&password, self.config.pepper())?;
        let user = User::new_superuser(email, password);
        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "Superuser created"
        );

        Ok(user)
    }

    /// Look up a user by email (normalized before lookup)
    pub async fn get_by_email(&self, email: &str) -> AccountResult<User> {
        let email = Email::new(email).map_err(|_| AccountError::UserNotFound)?;
        self.repo
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    pub async fn get_by_id(&self, user_id: &UserId) -> AccountResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    /// Check an email/password pair
    ///
    /// Every failure collapses to `InvalidCredentials` so callers cannot
    /// tell which part was wrong.
    pub async fn verify_credentials(&self, email: &str, password: String) -> AccountResult<User> {
        let email = Email::new(email).map_err(|_| AccountError::InvalidCredentials)?;
        let raw_password =
            RawPassword::new(password).map_err(|_| AccountError::InvalidCredentials)?;

        let Some(user) = self.repo.find_by_email(&email).await? else {
            if let Some(dummy) = dummy_password() {
                dummy.verify(&raw_password, self.config.pepper());
            }
            return Err(AccountError::InvalidCredentials);
        };

        if !user.password.verify(&raw_password, self.config.pepper()) {
            return Err(AccountError::InvalidCredentials);
        }

        if !user.can_login() {
            tracing::warn!(user_id = %user.user_id, "Login attempt on inactive account");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Apply the provided fields to the user's profile
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        input: UpdateProfileInput,
    ) -> AccountResult<User> {
        let mut user = self.get_by_id(user_id).await?;

        let mut errors = FieldErrors::new();
        let name = input
            .name
            .as_deref()
            .map(|raw| collect_name(&mut errors, raw));
        let password = input
            .password
            .map(|raw| collect(&mut errors, "password", RawPassword::new(raw)));
        errors.into_result().map_err(AccountError::Validation)?;

        if let Some(Some(name)) = name {
            user.set_name(name);
        }
        if let Some(Some(raw)) = password {
            user.set_password(UserPassword::from_raw(&raw, self.config.pepper())?);
        }

        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Profile updated");

        Ok(user)
    }

    /// All users ordered by email
    pub async fn list_users(&self) -> AccountResult<Vec<User>> {
        self.repo.list().await
    }
}
