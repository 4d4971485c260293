//! Role and Permission Entities
//!
//! Authorization model for role-based access control. Admin access is
//! granted through roles rather than a fixed admin account.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use std::collections::HashSet;

/// Role source - where the role definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleSource {
    /// Defined in code (cannot be modified)
    Code,
    /// Defined in database (can be modified)
    Database,
}

impl Default for RoleSource {
    fn default() -> Self {
        Self::Database
    }
}

/// Role definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRole {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Role code/name (unique per application)
    /// Format: {application}:{role_name} e.g., "depositcore:operations-admin"
    pub code: String,

    /// Human-readable display name
    pub display_name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Application this role belongs to
    pub application_code: String,

    /// Permissions granted by this role
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Where the role came from
    #[serde(default)]
    pub source: RoleSource,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl AuthRole {
    pub fn new(
        application_code: impl Into<String>,
        role_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let app = application_code.into();
        let name = role_name.into();
        let now = Utc::now();

        Self {
            id: crate::TsidGenerator::generate(),
            code: format!("{}:{}", app, name),
            display_name: display_name.into(),
            description: None,
            application_code: app,
            permissions: HashSet::new(),
            source: RoleSource::Database,
            created_at: now,
            updated_at: now,
            created_by: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for p in permissions {
            self.permissions.insert(p.into());
        }
        self
    }

    pub fn with_source(mut self, source: RoleSource) -> Self {
        self.source = source;
        self
    }

    pub fn grant_permission(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
        self.updated_at = Utc::now();
    }

    pub fn revoke_permission(&mut self, permission: &str) {
        self.permissions.remove(permission);
        self.updated_at = Utc::now();
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission) || self.has_wildcard_permission(permission)
    }

    /// Check for wildcard permissions
    /// Supports hierarchical wildcards for format: depositcore:category:entity:action
    /// Examples:
    ///   - "*:*" matches everything (superuser)
    ///   - "depositcore:*" matches all platform permissions
    ///   - "depositcore:invest:*" matches all investment permissions
    ///   - "depositcore:invest:order:*" matches all order operations
    fn has_wildcard_permission(&self, permission: &str) -> bool {
        // Check for *:* (superuser)
        if self.permissions.contains("*:*") {
            return true;
        }

        let parts: Vec<&str> = permission.split(':').collect();
        if parts.is_empty() {
            return false;
        }

        // Build progressively longer wildcard patterns
        let mut prefix = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                prefix.push(':');
            }
            prefix.push_str(part);

            // Don't check wildcard for the full permission (last part)
            if i < parts.len() - 1 {
                let wildcard = format!("{}:*", prefix);
                if self.permissions.contains(&wildcard) {
                    return true;
                }
            }
        }

        false
    }

    pub fn can_modify(&self) -> bool {
        self.source == RoleSource::Database
    }

    /// Extract role name from code
    pub fn role_name(&self) -> &str {
        self.code.split(':').nth(1).unwrap_or(&self.code)
    }
}

/// Platform permissions - Granular format: depositcore:{category}:{entity}:{action}
pub mod permissions {
    /// Investment permissions (orders, plans)
    pub mod invest {
        pub const ORDER_VIEW: &str = "depositcore:invest:order:view";
        pub const ORDER_REVIEW: &str = "depositcore:invest:order:review";
        pub const ORDER_PROCESS: &str = "depositcore:invest:order:process";

        pub const PLAN_VIEW: &str = "depositcore:invest:plan:view";
        pub const PLAN_CREATE: &str = "depositcore:invest:plan:create";
        pub const PLAN_UPDATE: &str = "depositcore:invest:plan:update";
        pub const PLAN_DELETE: &str = "depositcore:invest:plan:delete";

        pub const BANK_DETAIL_VIEW: &str = "depositcore:invest:bank-detail:view";
        pub const BANK_DETAIL_MANAGE: &str = "depositcore:invest:bank-detail:manage";

        /// All investment permissions
        pub const ALL: &[&str] = &[
            ORDER_VIEW, ORDER_REVIEW, ORDER_PROCESS,
            PLAN_VIEW, PLAN_CREATE, PLAN_UPDATE, PLAN_DELETE,
            BANK_DETAIL_VIEW, BANK_DETAIL_MANAGE,
        ];
    }

    /// Compliance permissions (KYC review)
    pub mod compliance {
        pub const KYC_VIEW: &str = "depositcore:compliance:kyc:view";
        pub const KYC_REVIEW: &str = "depositcore:compliance:kyc:review";
        pub const KYC_EDIT: &str = "depositcore:compliance:kyc:edit";

        /// All compliance permissions
        pub const ALL: &[&str] = &[KYC_VIEW, KYC_REVIEW, KYC_EDIT];
    }

    /// IAM permissions (user management)
    pub mod iam {
        pub const USER_VIEW: &str = "depositcore:iam:user:view";
        pub const USER_UPDATE: &str = "depositcore:iam:user:update";
        pub const USER_BAN: &str = "depositcore:iam:user:ban";

        /// All IAM permissions
        pub const ALL: &[&str] = &[USER_VIEW, USER_UPDATE, USER_BAN];
    }

    /// Support permissions (queries, feedback)
    pub mod support {
        pub const QUERY_VIEW: &str = "depositcore:support:query:view";
        pub const QUERY_REPLY: &str = "depositcore:support:query:reply";
        pub const FEEDBACK_VIEW: &str = "depositcore:support:feedback:view";

        /// All support permissions
        pub const ALL: &[&str] = &[QUERY_VIEW, QUERY_REPLY, FEEDBACK_VIEW];
    }

    /// Insight permissions (analytics, audit logs)
    pub mod insights {
        pub const ANALYTICS_VIEW: &str = "depositcore:insights:analytics:view";
        pub const AUDIT_LOG_VIEW: &str = "depositcore:insights:audit-log:view";

        /// All insight permissions
        pub const ALL: &[&str] = &[ANALYTICS_VIEW, AUDIT_LOG_VIEW];
    }

    /// Superuser permission (grants all access)
    pub const ADMIN_ALL: &str = "*:*";
}

/// Built-in platform roles
pub mod roles {
    use super::*;

    /// Super admin - full access to everything
    pub fn super_admin() -> AuthRole {
        AuthRole::new("depositcore", "super-admin", "Super Administrator")
            .with_description("Full access to all platform features")
            .with_permission(permissions::ADMIN_ALL)
            .with_source(RoleSource::Code)
    }

    /// Operations admin - manages orders, plans, and bank details
    pub fn operations_admin() -> AuthRole {
        let mut role = AuthRole::new("depositcore", "operations-admin", "Operations Administrator")
            .with_description("Reviews orders and manages plans and bank details")
            .with_source(RoleSource::Code);
        for p in permissions::invest::ALL {
            role.permissions.insert((*p).to_string());
        }
        role.permissions.insert(permissions::insights::ANALYTICS_VIEW.to_string());
        role
    }

    /// Compliance officer - reviews KYC submissions
    pub fn compliance_officer() -> AuthRole {
        let mut role = AuthRole::new("depositcore", "compliance-officer", "Compliance Officer")
            .with_description("Reviews KYC submissions and manages user standing")
            .with_source(RoleSource::Code);
        for p in permissions::compliance::ALL {
            role.permissions.insert((*p).to_string());
        }
        for p in permissions::iam::ALL {
            role.permissions.insert((*p).to_string());
        }
        role
    }

    /// Support agent - handles support queries and feedback
    pub fn support_agent() -> AuthRole {
        let mut role = AuthRole::new("depositcore", "support-agent", "Support Agent")
            .with_description("Answers support queries and reviews feedback")
            .with_source(RoleSource::Code);
        for p in permissions::support::ALL {
            role.permissions.insert((*p).to_string());
        }
        role.permissions.insert(permissions::iam::USER_VIEW.to_string());
        role
    }

    /// Analyst - read-only access to analytics and audit logs
    pub fn analyst() -> AuthRole {
        let mut role = AuthRole::new("depositcore", "analyst", "Analyst")
            .with_description("Read-only access to analytics and audit history")
            .with_source(RoleSource::Code);
        for p in permissions::insights::ALL {
            role.permissions.insert((*p).to_string());
        }
        role
    }

    /// Get all built-in roles
    pub fn all() -> Vec<AuthRole> {
        vec![
            super_admin(),
            operations_admin(),
            compliance_officer(),
            support_agent(),
            analyst(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_matching() {
        let role = AuthRole::new("depositcore", "ops", "Operations")
            .with_permission(permissions::invest::ORDER_VIEW)
            .with_permission(permissions::invest::ORDER_REVIEW)
            .with_permission("depositcore:compliance:*");

        assert!(role.has_permission(permissions::invest::ORDER_VIEW));
        assert!(role.has_permission(permissions::invest::ORDER_REVIEW));
        assert!(!role.has_permission(permissions::invest::PLAN_DELETE));

        // Wildcard matching
        assert!(role.has_permission(permissions::compliance::KYC_VIEW));
        assert!(role.has_permission(permissions::compliance::KYC_REVIEW));
    }

    #[test]
    fn test_superuser_permission() {
        let role = roles::super_admin();

        assert!(role.has_permission(permissions::invest::ORDER_REVIEW));
        assert!(role.has_permission(permissions::iam::USER_BAN));
        assert!(role.has_permission(permissions::insights::ANALYTICS_VIEW));
        assert!(role.has_permission("anything:everything"));
    }

    #[test]
    fn test_built_in_roles() {
        let all_roles = roles::all();
        assert_eq!(all_roles.len(), 5);

        // Super admin has wildcard
        let super_admin = roles::super_admin();
        assert!(super_admin.permissions.contains(permissions::ADMIN_ALL));

        // Compliance officer can review KYC but not orders
        let compliance = roles::compliance_officer();
        assert!(compliance.has_permission(permissions::compliance::KYC_REVIEW));
        assert!(compliance.has_permission(permissions::iam::USER_BAN));
        assert!(!compliance.has_permission(permissions::invest::ORDER_REVIEW));

        // Support agent cannot view analytics
        let support = roles::support_agent();
        assert!(support.has_permission(permissions::support::QUERY_REPLY));
        assert!(!support.has_permission(permissions::insights::ANALYTICS_VIEW));
    }
}
