//! Storage Module
//!
//! Object-store backed blob storage and the multipart upload endpoint.

pub mod blob;
pub mod api;

pub use blob::{BlobStorage, StoredBlob, ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};
pub use api::{upload_router, StorageState, UploadResponse};
