//! Order Module
//!
//! Fixed-deposit order aggregate: checkout, payment submission, admin
//! review, fulfillment tracking, and certificates.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{BankSnapshot, Certificate, FulfillmentStage, Order, OrderStatus};
pub use repository::OrderRepository;
pub use api::{admin_orders_router, orders_router, OrdersState};
