//! Role Aggregate
//!
//! Role-based access control: role definitions, permission constants,
//! and built-in roles.

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{AuthRole, RoleSource, permissions, roles};
pub use repository::RoleRepository;
