//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{auth_token::AuthToken, user::User};
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, token_key::TokenDigest, user_id::UserId,
    user_password::UserPassword,
};
use crate::error::{AccountError, AccountResult};

const SELECT_USER: &str = r#"
    SELECT
        user_id,
        email,
        name,
        password_hash,
        is_active,
        is_staff,
        is_superuser,
        last_login_at,
        created_at,
        updated_at
    FROM users
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountRepository {
    async fn create(&self, user: &User) -> AccountResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                name,
                password_hash,
                is_active,
                is_staff,
                is_superuser,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.name.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AccountError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE user_id = $1"))
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AccountResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AccountResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                password_hash = $3,
                is_active = $4,
                is_staff = $5,
                is_superuser = $6,
                updated_at = $7
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AccountError::UserNotFound);
        }

        Ok(())
    }

    async fn list(&self) -> AccountResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} ORDER BY email"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_user()).collect()
    }
}

// ============================================================================
// Auth Token Repository Implementation
// ============================================================================

impl AuthTokenRepository for PgAccountRepository {
    async fn replace_for_login(&self, token: &AuthToken) -> AccountResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET last_login_at = $2, updated_at = $2 WHERE user_id = $1",
        )
        .bind(token.user_id.as_uuid())
        .bind(token.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            // dropping the transaction rolls it back
            return Err(AccountError::UserNotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO auth_tokens (user_id, token_digest, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                token_digest = EXCLUDED.token_digest,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(token.user_id.as_uuid())
        .bind(&token.digest.as_bytes()[..])
        .bind(token.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_digest(&self, digest: &TokenDigest) -> AccountResult<Option<AuthToken>> {
        let row = sqlx::query_as::<_, AuthTokenRow>(
            r#"
            SELECT
                user_id,
                token_digest,
                created_at
            FROM auth_tokens
            WHERE token_digest = $1
            "#,
        )
        .bind(&digest.as_bytes()[..])
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_token()).transpose()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AccountResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            name: DisplayName::from_db(self.name),
            password: UserPassword::from_phc_string(self.password_hash)?,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthTokenRow {
    user_id: Uuid,
    token_digest: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl AuthTokenRow {
    fn into_token(self) -> AccountResult<AuthToken> {
        let digest = TokenDigest::from_slice(&self.token_digest)
            .ok_or_else(|| AccountError::Internal("Invalid token digest in database".to_string()))?;

        Ok(AuthToken {
            user_id: UserId::from_uuid(self.user_id),
            digest,
            created_at: self.created_at,
        })
    }
}
