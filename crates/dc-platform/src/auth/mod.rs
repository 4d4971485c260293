//! Authentication
//!
//! JWT token generation and validation.

pub mod auth_service;

pub use auth_service::{AuthService, AuthConfig, AccessTokenClaims, extract_bearer_token};
