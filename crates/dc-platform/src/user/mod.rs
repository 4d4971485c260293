//! User Module
//!
//! Users provisioned from the identity provider, ban management,
//! and the ban-detection status endpoint.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{User, UserStatus};
pub use repository::UserRepository;
pub use api::{user_status_router, admin_users_router, UsersState};
