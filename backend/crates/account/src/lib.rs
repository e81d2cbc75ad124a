//! Account Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - User Store and Token Service
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, auth extractors, router
//!
//! ## Features
//! - Registration with email + password (+ optional display name)
//! - Opaque bearer tokens, one per user, issued on credential check
//! - Profile retrieval and partial update for the token's owner
//! - Staff-only user administration (list, view, add)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Only the SHA-256 digest of a token is stored
//! - Inactive users can neither obtain nor use tokens

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AccountConfig;
pub use application::{TokenService, UserStore};
pub use error::{AccountError, AccountResult};
pub use infra::{memory::InMemoryAccountRepository, postgres::PgAccountRepository};
pub use presentation::router::{account_router, account_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
