//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod tsid;
pub mod middleware;
pub mod api_common;
pub mod indexes;

// APIs
pub mod health_api;

// Services
pub mod authorization_service;

// Re-export commonly used items
pub use error::{PlatformError, Result};
pub use tsid::TsidGenerator;
pub use middleware::{Authenticated, AppState};
pub use api_common::{PaginationParams, PaginatedResponse};
pub use health_api::health_router;
pub use authorization_service::AuthorizationService;
