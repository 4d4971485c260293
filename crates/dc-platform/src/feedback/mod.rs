//! Feedback Module
//!
//! User testimonials with admin-controlled publishing.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::Feedback;
pub use repository::FeedbackRepository;
pub use api::{admin_feedback_router, feedback_router, FeedbackState};
