//! Upload API
//!
//! Multipart upload endpoint for payment proofs, KYC documents, and
//! certificates. The stored URL is what the other endpoints accept in
//! `paymentProof`, `documentUrl`, and `certificateUrl` fields.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::storage::blob::BlobStorage;

const DEFAULT_CATEGORY: &str = "documents";

/// Upload response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub size: usize,
}

/// Storage service state
#[derive(Clone)]
pub struct StorageState {
    pub blob_storage: Arc<BlobStorage>,
}

/// Upload a file
///
/// Expects a multipart form with a `file` field and an optional `category`
/// field selecting the storage prefix.
#[utoipa::path(
    post,
    path = "",
    tag = "upload",
    operation_id = "postApiUpload",
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file, oversized, or unsupported content type")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    State(state): State<StorageState>,
    auth: Authenticated,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, PlatformError> {
    let mut category = DEFAULT_CATEGORY.to_string();
    let mut file: Option<(String, String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PlatformError::validation(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some("category") => {
                category = field
                    .text()
                    .await
                    .map_err(|e| PlatformError::validation(format!("Invalid category field: {}", e)))?;
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .ok_or_else(|| PlatformError::validation("File field is missing a content type"))?
                    .to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| PlatformError::validation(format!("Failed to read file field: {}", e)))?;
                file = Some((filename, content_type, content));
            }
            _ => {}
        }
    }

    let (filename, content_type, content) =
        file.ok_or_else(|| PlatformError::validation("Multipart request is missing a 'file' field"))?;

    let blob = state
        .blob_storage
        .put(&category, &filename, &content_type, content)
        .await?;

    tracing::info!(
        principal_id = %auth.principal_id,
        url = %blob.url,
        "File uploaded"
    );

    Ok(Json(UploadResponse {
        url: blob.url,
        size: blob.size,
    }))
}

/// Create the upload router (mounted under /api/upload)
pub fn upload_router(state: StorageState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(upload_file))
        .with_state(state)
}
