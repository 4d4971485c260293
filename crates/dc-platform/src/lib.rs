//! DepositCore Platform
//!
//! Fixed-deposit investment platform backend:
//! - Orders with an explicit payment-review state machine
//! - KYC submission and admin review
//! - In-app notifications with SSE live feeds
//! - Support queries, feedback, plans, and receiving bank accounts
//! - Admin analytics computed as pure folds over snapshots
//! - Use Case pattern with guaranteed event and audit logging
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations (where applicable)

// Core aggregates
pub mod user;
pub mod order;
pub mod kyc;
pub mod plan;
pub mod bank_detail;

// Engagement aggregates
pub mod notification;
pub mod query;
pub mod feedback;

// Event store
pub mod event;

// Authentication & authorization
pub mod auth;
pub mod role;
pub mod audit;

// Shared infrastructure
pub mod shared;
pub mod storage;
pub mod stream;
pub mod analytics;

// Cross-cutting concerns
pub mod usecase;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export use case infrastructure
pub use usecase::{
    UseCaseResult, UseCaseError, DomainEvent, ExecutionContext,
    UnitOfWork, MongoUnitOfWork,
};
// Note: impl_domain_event! and details! macros are exported at the crate
// root via #[macro_export]

// Re-export main entity types for convenience
pub use user::entity::{User, UserStatus};
pub use order::entity::{Order, OrderStatus, FulfillmentStage, BankSnapshot, Certificate};
pub use kyc::entity::{KycRecord, KycStatus, KycDetails, DocumentType};
pub use plan::entity::InvestmentPlan;
pub use bank_detail::entity::BankDetail;
pub use notification::entity::{Notification, NotificationSeverity};
pub use query::entity::{SupportQuery, QueryStatus, QueryType, QueryMessage, QuerySender};
pub use feedback::entity::Feedback;
pub use event::entity::{Event, ContextData};
pub use role::entity::{AuthRole, RoleSource, permissions, roles};
pub use audit::entity::AuditLog;

// Re-export repositories
pub use user::repository::UserRepository;
pub use order::repository::OrderRepository;
pub use kyc::repository::KycRepository;
pub use plan::repository::PlanRepository;
pub use bank_detail::repository::BankDetailRepository;
pub use notification::repository::NotificationRepository;
pub use query::repository::QueryRepository;
pub use feedback::repository::FeedbackRepository;
pub use role::repository::RoleRepository;
pub use audit::repository::AuditLogRepository;

// Re-export services
pub use audit::service::AuditService;
pub use auth::auth_service::{AuthService, AuthConfig, AccessTokenClaims};
pub use notification::emitter::NotificationEmitter;
pub use storage::blob::BlobStorage;
pub use stream::watcher::CollectionWatcher;
pub use shared::authorization_service::{AuthorizationService, AuthContext, checks};
