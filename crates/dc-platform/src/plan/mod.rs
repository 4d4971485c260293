//! Investment Plan Module

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::InvestmentPlan;
pub use repository::PlanRepository;
pub use api::{plans_router, admin_plans_router, PlansState};
