//! KYC Module
//!
//! Identity verification: user submission, admin review, and the
//! denormalized status on the user document.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{DocumentType, KycDetails, KycRecord, KycStatus};
pub use repository::KycRepository;
pub use api::{admin_kyc_router, kyc_router, KycState};
