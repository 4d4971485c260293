//! Audit Service
//!
//! Centralized audit logging for mutations that do not go through the
//! unit of work (administrative CRUD, support replies, and similar).

use std::sync::Arc;
use tracing::{info, error};

use crate::AuditLog;
use crate::AuditLogRepository;
use crate::AuthContext;
use crate::shared::error::Result;

/// Audit service for recording platform actions
#[derive(Clone)]
pub struct AuditService {
    repo: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<AuditLogRepository>) -> Self {
        Self { repo }
    }

    /// Log a create action
    pub async fn log_create(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        operation: impl Into<String>,
    ) -> Result<()> {
        let log = self.build_log(auth, entity_type, Some(entity_id), operation);
        self.insert(log).await
    }

    /// Log an update action
    pub async fn log_update(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        operation: impl Into<String>,
    ) -> Result<()> {
        let log = self.build_log(auth, entity_type, Some(entity_id), operation);
        self.insert(log).await
    }

    /// Log a delete action
    pub async fn log_delete(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        operation: impl Into<String>,
    ) -> Result<()> {
        let log = self.build_log(auth, entity_type, Some(entity_id), operation);
        self.insert(log).await
    }

    /// Build an audit log from auth context
    fn build_log(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: Option<&str>,
        operation: impl Into<String>,
    ) -> AuditLog {
        AuditLog::new(
            entity_type,
            entity_id.map(String::from),
            operation,
            None,
            Some(auth.principal_id.clone()),
        )
    }

    /// Insert an audit log
    async fn insert(&self, log: AuditLog) -> Result<()> {
        info!(
            operation = %log.operation,
            entity_type = %log.entity_type,
            entity_id = ?log.entity_id,
            principal_id = ?log.principal_id,
            "Audit log recorded"
        );

        if let Err(e) = self.repo.insert(&log).await {
            error!(error = %e, "Failed to insert audit log");
            // Don't fail the operation if audit logging fails
        }

        Ok(())
    }
}
