//! Support Query Module
//!
//! Guest-friendly support conversations with admin replies.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{QueryMessage, QuerySender, QueryStatus, QueryType, SupportQuery};
pub use repository::QueryRepository;
pub use api::{admin_queries_router, queries_router, QueriesState};
