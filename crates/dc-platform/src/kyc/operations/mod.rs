//! KYC Operations
//!
//! Use cases for the KYC review lifecycle.

pub mod events;
pub mod submit;
pub mod review;
pub mod admin_edit;

pub use events::*;
pub use submit::{SubmitKycCommand, SubmitKycUseCase};
pub use review::{ReviewKycCommand, ReviewKycUseCase};
pub use admin_edit::{AdminEditKycCommand, AdminEditKycUseCase};
