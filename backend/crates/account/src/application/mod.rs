//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod token_service;
pub mod user_store;

// Re-exports
pub use config::AccountConfig;
pub use token_service::TokenService;
pub use user_store::{AccountFlags, CreateUserInput, UpdateProfileInput, UserStore};
