//! Blob Storage
//!
//! Object-store backed storage for payment proofs, KYC documents, and
//! certificates. The backend is anything implementing `ObjectStore`; the
//! server wires a `LocalFileSystem` root by default.

use bytes::Bytes;
use object_store::{path::Path as StoragePath, ObjectStore, PutPayload};
use std::sync::Arc;
use tracing::info;

use crate::shared::error::{PlatformError, Result};

/// Maximum accepted upload size (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted content types for uploads
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/pdf",
];

/// A stored blob, addressable through the public URL
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Key within the object store
    pub key: String,
    /// URL clients use to reference the blob
    pub url: String,
    pub size: usize,
}

/// Blob storage service
#[derive(Clone)]
pub struct BlobStorage {
    store: Arc<dyn ObjectStore>,
    /// Prefix prepended to keys when building public URLs
    public_base: String,
}

impl BlobStorage {
    pub fn new(store: Arc<dyn ObjectStore>, public_base: impl Into<String>) -> Self {
        Self {
            store,
            public_base: public_base.into(),
        }
    }

    /// Validate and store a blob under `category`, returning its public URL.
    /// Rejects payloads over 5 MiB and content types outside the allow list.
    pub async fn put(
        &self,
        category: &str,
        filename: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<StoredBlob> {
        if content.is_empty() {
            return Err(PlatformError::validation("Uploaded file is empty"));
        }
        if content.len() > MAX_UPLOAD_BYTES {
            return Err(PlatformError::validation(format!(
                "File exceeds the {} MiB upload limit",
                MAX_UPLOAD_BYTES / 1024 / 1024
            )));
        }
        let extension = extension_for(content_type).ok_or_else(|| {
            PlatformError::validation(format!(
                "Unsupported content type '{}'. Accepted: {}",
                content_type,
                ALLOWED_CONTENT_TYPES.join(", ")
            ))
        })?;

        let size = content.len();
        let key = format!(
            "{}/{}.{}",
            sanitize_segment(category),
            crate::TsidGenerator::generate(),
            extension
        );
        let location = StoragePath::from(key.clone());

        self.store
            .put(&location, PutPayload::from(content))
            .await
            .map_err(|e| PlatformError::storage(format!("Failed to store blob: {}", e)))?;

        info!(
            key = %key,
            original_name = %filename,
            content_type = %content_type,
            size = size,
            "Blob stored"
        );

        Ok(StoredBlob {
            url: format!("{}/{}", self.public_base.trim_end_matches('/'), key),
            key,
            size,
        })
    }
}

/// File extension for an accepted content type
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

/// Restrict a path segment to a safe character set
fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "documents".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn storage() -> BlobStorage {
        BlobStorage::new(Arc::new(InMemory::new()), "/api/blob")
    }

    #[tokio::test]
    async fn test_put_returns_url_under_category() {
        let blob = storage()
            .put("payment-proofs", "proof.png", "image/png", Bytes::from_static(b"fake-png"))
            .await
            .unwrap();
        assert!(blob.url.starts_with("/api/blob/payment-proofs/"));
        assert!(blob.url.ends_with(".png"));
        assert_eq!(blob.size, 8);
    }

    #[tokio::test]
    async fn test_put_rejects_unsupported_content_type() {
        let err = storage()
            .put("documents", "run.exe", "application/octet-stream", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_put_rejects_oversized_payload() {
        let payload = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]);
        let err = storage()
            .put("documents", "big.pdf", "application/pdf", payload)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_put_rejects_empty_payload() {
        let err = storage()
            .put("documents", "empty.pdf", "application/pdf", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
    }

    #[test]
    fn test_sanitize_segment_strips_traversal() {
        assert_eq!(sanitize_segment("../etc"), "etc");
        assert_eq!(sanitize_segment("kyc-docs"), "kyc-docs");
        assert_eq!(sanitize_segment("../.."), "documents");
    }
}
