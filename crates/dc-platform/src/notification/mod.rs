//! Notification Module
//!
//! In-app notifications: the emitter that order/KYC/query flows call,
//! the read-side API, and the SSE live feed.

pub mod entity;
pub mod repository;
pub mod emitter;
pub mod api;

pub use entity::{Notification, NotificationSeverity};
pub use repository::NotificationRepository;
pub use emitter::NotificationEmitter;
pub use api::{notifications_router, NotificationsState};
