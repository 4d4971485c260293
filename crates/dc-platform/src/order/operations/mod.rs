//! Order Operations
//!
//! Use cases for the order lifecycle.

pub mod events;
pub mod create;
pub mod submit_payment;
pub mod decide;
pub mod mark_processing;
pub mod attach_certificate;

pub use events::*;
pub use create::{CreateOrderCommand, CreateOrderUseCase};
pub use submit_payment::{SubmitPaymentCommand, SubmitPaymentUseCase};
pub use decide::{DecideOrderCommand, DecideOrderUseCase};
pub use mark_processing::{MarkProcessingCommand, MarkProcessingUseCase};
pub use attach_certificate::{AttachCertificateCommand, AttachCertificateUseCase};
