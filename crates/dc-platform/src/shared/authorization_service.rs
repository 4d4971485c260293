//! Authorization Service
//!
//! Permission-based access control with role resolution. Context building
//! also enforces the account ban: a banned user holding a still-valid JWT
//! is rejected here, before any handler runs.

use std::collections::HashSet;
use std::sync::Arc;
use crate::permissions;
use crate::{RoleRepository, User, UserRepository};
use crate::shared::error::{PlatformError, Result};
use crate::AccessTokenClaims;

/// Authorization context for a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Principal ID (user ID)
    pub principal_id: String,

    /// Principal scope (ADMIN or CUSTOMER)
    pub scope: String,

    /// Email
    pub email: Option<String>,

    /// Display name
    pub name: String,

    /// All permissions (resolved from roles)
    pub permissions: HashSet<String>,

    /// Role codes
    pub roles: Vec<String>,
}

impl AuthContext {
    /// Create from JWT claims with resolved permissions
    pub fn from_claims_with_permissions(
        claims: &AccessTokenClaims,
        permissions: HashSet<String>,
    ) -> Self {
        Self {
            principal_id: claims.sub.clone(),
            scope: claims.scope.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            permissions,
            roles: claims.roles.clone(),
        }
    }

    /// Check if this context is for an admin principal
    pub fn is_admin(&self) -> bool {
        self.scope == "ADMIN"
    }

    /// Check if this context has a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        // Direct match
        if self.permissions.contains(permission) {
            return true;
        }

        // Superuser *:*
        if self.permissions.contains(permissions::ADMIN_ALL) {
            return true;
        }

        // Hierarchical wildcard matching: for "depositcore:invest:order:view"
        // check "depositcore:*", "depositcore:invest:*", "depositcore:invest:order:*"
        let parts: Vec<&str> = permission.split(':').collect();
        let mut prefix = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                prefix.push(':');
            }
            prefix.push_str(part);

            if i < parts.len() - 1 {
                let wildcard = format!("{}:*", prefix);
                if self.permissions.contains(&wildcard) {
                    return true;
                }
            }
        }

        false
    }

    /// Check if this context has all specified permissions
    pub fn has_all_permissions(&self, required: &[&str]) -> bool {
        required.iter().all(|p| self.has_permission(p))
    }

    /// Check if this context has any of the specified permissions
    pub fn has_any_permission(&self, required: &[&str]) -> bool {
        required.iter().any(|p| self.has_permission(p))
    }

    /// Check if this context has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&role.to_string())
    }
}

/// Accounts are provisioned lazily, so a missing document is not a ban.
fn ensure_account_active(user: Option<&User>) -> Result<()> {
    match user {
        Some(user) if user.is_banned() => {
            Err(PlatformError::forbidden("Account is banned"))
        }
        _ => Ok(()),
    }
}

/// Authorization service for checking permissions
pub struct AuthorizationService {
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
}

impl AuthorizationService {
    pub fn new(role_repo: Arc<RoleRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self { role_repo, user_repo }
    }

    /// Build an authorization context from JWT claims.
    /// Rejects banned accounts and resolves all permissions from roles.
    pub async fn build_context(&self, claims: &AccessTokenClaims) -> Result<AuthContext> {
        let user = self.user_repo.find_by_id(&claims.sub).await?;
        ensure_account_active(user.as_ref())?;

        let permissions = self.resolve_permissions(&claims.roles).await?;
        Ok(AuthContext::from_claims_with_permissions(claims, permissions))
    }

    /// Resolve all permissions for a set of role codes
    async fn resolve_permissions(&self, role_codes: &[String]) -> Result<HashSet<String>> {
        if role_codes.is_empty() {
            return Ok(HashSet::new());
        }

        let roles = self.role_repo.find_by_codes(role_codes).await?;
        let mut permissions = HashSet::new();

        for role in roles {
            permissions.extend(role.permissions);
        }

        Ok(permissions)
    }

    /// Require admin scope
    pub fn require_admin(&self, context: &AuthContext) -> Result<()> {
        if !context.is_admin() {
            return Err(PlatformError::forbidden("Admin access required"));
        }
        Ok(())
    }

    /// Require specific permission
    pub fn require_permission(&self, context: &AuthContext, permission: &str) -> Result<()> {
        if !context.has_permission(permission) {
            return Err(PlatformError::forbidden(format!(
                "Permission required: {}",
                permission
            )));
        }
        Ok(())
    }
}

/// Common authorization checks
pub mod checks {
    use super::*;

    /// Require admin scope
    pub fn require_admin(context: &AuthContext) -> Result<()> {
        if context.is_admin() {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Admin access required"))
        }
    }

    /// Check view access to orders
    pub fn can_view_orders(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::invest::ORDER_VIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot view orders"))
        }
    }

    /// Check review access to orders (approve/reject payments)
    pub fn can_review_orders(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::invest::ORDER_REVIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot review orders"))
        }
    }

    /// Check fulfillment access to orders (processing, certificates)
    pub fn can_process_orders(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::invest::ORDER_PROCESS) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot process orders"))
        }
    }

    /// Check manage access to investment plans
    pub fn can_manage_plans(context: &AuthContext) -> Result<()> {
        if context.has_any_permission(&[
            permissions::invest::PLAN_CREATE,
            permissions::invest::PLAN_UPDATE,
            permissions::invest::PLAN_DELETE,
        ]) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot manage plans"))
        }
    }

    /// Check manage access to bank details
    pub fn can_manage_bank_details(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::invest::BANK_DETAIL_MANAGE) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot manage bank details"))
        }
    }

    /// Check view access to KYC records
    pub fn can_view_kyc(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::compliance::KYC_VIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot view KYC records"))
        }
    }

    /// Check review access to KYC records (approve/reject)
    pub fn can_review_kyc(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::compliance::KYC_REVIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot review KYC records"))
        }
    }

    /// Check edit access to KYC records
    pub fn can_edit_kyc(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::compliance::KYC_EDIT) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot edit KYC records"))
        }
    }

    /// Check view access to users
    pub fn can_view_users(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::iam::USER_VIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot view users"))
        }
    }

    /// Check manage access to users (update, ban, reactivate)
    pub fn can_manage_users(context: &AuthContext) -> Result<()> {
        if context.has_any_permission(&[
            permissions::iam::USER_UPDATE,
            permissions::iam::USER_BAN,
        ]) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot manage users"))
        }
    }

    /// Check view access to support queries
    pub fn can_view_queries(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::support::QUERY_VIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot view support queries"))
        }
    }

    /// Check reply access to support queries
    pub fn can_reply_queries(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::support::QUERY_REPLY) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot reply to support queries"))
        }
    }

    /// Check view access to feedback
    pub fn can_view_feedback(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::support::FEEDBACK_VIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot view feedback"))
        }
    }

    /// Check view access to analytics
    pub fn can_view_analytics(context: &AuthContext) -> Result<()> {
        if context.has_permission(permissions::insights::ANALYTICS_VIEW) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Cannot view analytics"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_context(permissions: Vec<&str>, scope: &str) -> AuthContext {
        AuthContext {
            principal_id: "test123".to_string(),
            scope: scope.to_string(),
            email: Some("test@example.com".to_string()),
            name: "Test User".to_string(),
            permissions: permissions.into_iter().map(String::from).collect(),
            roles: vec!["depositcore:operations-admin".to_string()],
        }
    }

    #[test]
    fn test_direct_permission() {
        let ctx = create_test_context(vec![permissions::invest::ORDER_VIEW], "ADMIN");
        assert!(ctx.has_permission(permissions::invest::ORDER_VIEW));
        assert!(!ctx.has_permission(permissions::invest::ORDER_REVIEW));
    }

    #[test]
    fn test_wildcard_permission() {
        let ctx = create_test_context(vec!["depositcore:invest:*"], "ADMIN");
        assert!(ctx.has_permission(permissions::invest::ORDER_VIEW));
        assert!(ctx.has_permission(permissions::invest::PLAN_DELETE));
        assert!(!ctx.has_permission(permissions::compliance::KYC_REVIEW));
    }

    #[test]
    fn test_superuser_permission() {
        let ctx = create_test_context(vec!["*:*"], "ADMIN");
        assert!(ctx.has_permission(permissions::invest::ORDER_REVIEW));
        assert!(ctx.has_permission(permissions::iam::USER_BAN));
        assert!(ctx.has_permission("anything:everything"));
    }

    #[test]
    fn test_customer_has_no_admin_access() {
        let ctx = create_test_context(vec![], "CUSTOMER");
        assert!(!ctx.is_admin());
        assert!(checks::require_admin(&ctx).is_err());
        assert!(checks::can_review_orders(&ctx).is_err());
    }

    #[test]
    fn test_banned_account_rejected_before_context_build() {
        let mut user = User::new("alice@example.com", "Alice");
        user.ban();
        assert!(ensure_account_active(Some(&user)).is_err());

        user.reactivate();
        assert!(ensure_account_active(Some(&user)).is_ok());

        // Not yet provisioned is not banned
        assert!(ensure_account_active(None).is_ok());
    }

    #[test]
    fn test_check_helpers() {
        let ctx = create_test_context(
            vec![
                permissions::compliance::KYC_VIEW,
                permissions::compliance::KYC_REVIEW,
            ],
            "ADMIN",
        );
        assert!(checks::can_view_kyc(&ctx).is_ok());
        assert!(checks::can_review_kyc(&ctx).is_ok());
        assert!(checks::can_edit_kyc(&ctx).is_err());
        assert!(checks::can_view_analytics(&ctx).is_err());
    }
}
