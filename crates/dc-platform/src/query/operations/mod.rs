//! Support Query Operations

pub mod events;
pub mod submit;
pub mod reply;
pub mod resolve;

pub use events::*;
pub use submit::{SubmitQueryCommand, SubmitQueryUseCase};
pub use reply::{ReplyQueryCommand, ReplyQueryUseCase};
pub use resolve::{ResolveQueryCommand, ResolveQueryUseCase};
