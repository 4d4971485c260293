//! Bank Detail Module
//!
//! Platform receiving accounts with a transactional default switch.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::BankDetail;
pub use repository::BankDetailRepository;
pub use api::{bank_details_router, admin_bank_details_router, BankDetailsState};
