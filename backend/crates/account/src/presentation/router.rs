//! Account Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::config::AccountConfig;
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AccountAppState};

/// Create the Account router with PostgreSQL repository
pub fn account_router(repo: PgAccountRepository, config: AccountConfig) -> Router {
    account_router_generic(repo, config)
}

/// Create a generic Account router for any repository implementation
///
/// Methods not listed for a path answer `405 Method Not Allowed`.
pub fn account_router_generic<R>(repo: R, config: AccountConfig) -> Router
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let state = AccountAppState::new(repo, config);

    Router::new()
        .route("/users/create", post(handlers::create_user::<R>))
        .route("/users/token", post(handlers::obtain_token::<R>))
        .route(
            "/users/update",
            get(handlers::retrieve_profile).patch(handlers::update_profile::<R>),
        )
        .route(
            "/admin/users",
            get(handlers::list_users::<R>).post(handlers::admin_create_user::<R>),
        )
        .route("/admin/users/{user_id}", get(handlers::get_user::<R>))
        .with_state(state)
}
