//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and auth extractors.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AccountAppState;
pub use middleware::{CurrentUser, StaffUser, extract_token};
pub use router::{account_router, account_router_generic};
