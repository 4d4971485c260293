//! Platform API Integration Tests
//!
//! Tests for platform domain models, authorization, and error handling.

use std::collections::HashSet;

use dc_platform::{
    BankDetail, BankSnapshot, DocumentType, Feedback, FulfillmentStage,
    InvestmentPlan, KycDetails, KycRecord, KycStatus, Order, OrderStatus,
    QueryStatus, QueryType, SupportQuery, User, UserStatus,
};
use dc_platform::TsidGenerator;

fn sample_kyc_details() -> KycDetails {
    KycDetails {
        full_name: "Alice Kumar".to_string(),
        date_of_birth: "1990-04-12".to_string(),
        address: "12 Marine Drive, Mumbai".to_string(),
        document_type: DocumentType::Pan,
        document_number: "ABCDE1234F".to_string(),
        document_url: "https://blob/kyc/doc.pdf".to_string(),
    }
}

// Unit tests for domain models
mod domain_tests {
    use super::*;

    #[test]
    fn test_order_full_lifecycle() {
        let detail = BankDetail::new("DepositCore Ltd", "1234567890", "HDFC0001234", "HDFC Bank", None);
        let mut order = Order::new(
            "user-1",
            "Alice",
            "alice@example.com",
            "plan-1",
            "Gold Saver",
            50000.0,
            Some(BankSnapshot::from(&detail)),
        );
        assert_eq!(order.status, OrderStatus::Pending);

        order.submit_payment("TXN-42".to_string(), Some("https://blob/proof.png".to_string()), None).unwrap();
        assert_eq!(order.status, OrderStatus::PaymentUploaded);

        order.approve(Some("verified".to_string())).unwrap();
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.fulfillment_stage, Some(FulfillmentStage::Confirmed));

        order.mark_processing().unwrap();
        assert_eq!(order.fulfillment_stage, Some(FulfillmentStage::Processing));

        order.attach_certificate("https://blob/cert.pdf".to_string(), "admin-1".to_string()).unwrap();
        assert_eq!(order.status, OrderStatus::Active);
        assert!(order.certificate.is_some());
    }

    #[test]
    fn test_order_double_approve_fails() {
        let mut order = Order::new("user-1", "Alice", "alice@example.com", "plan-1", "Gold Saver", 50000.0, None);
        order.submit_payment("TXN-1".to_string(), None, None).unwrap();
        order.approve(None).unwrap();

        let err = order.approve(None).unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_AWAITING_REVIEW");
        assert_eq!(order.status, OrderStatus::Active);
    }

    #[test]
    fn test_kyc_review_cycle() {
        let mut record = KycRecord::new("user-1", sample_kyc_details());
        assert_eq!(record.status, KycStatus::Submitted);

        record.reject("admin-1", "Document unreadable").unwrap();
        assert_eq!(record.status, KycStatus::Rejected);
        assert_eq!(record.rejection_reason.as_deref(), Some("Document unreadable"));

        // Resubmission clears the review outcome
        record.resubmit(sample_kyc_details()).unwrap();
        assert_eq!(record.status, KycStatus::Submitted);
        assert!(record.rejection_reason.is_none());
        assert!(record.reviewed_by.is_none());

        record.approve("admin-2").unwrap();
        assert_eq!(record.status, KycStatus::Approved);
        assert_eq!(record.reviewed_by.as_deref(), Some("admin-2"));
    }

    #[test]
    fn test_kyc_approved_record_cannot_resubmit() {
        let mut record = KycRecord::new("user-1", sample_kyc_details());
        record.approve("admin-1").unwrap();

        let err = record.resubmit(sample_kyc_details()).unwrap_err();
        assert_eq!(err.code(), "KYC_ALREADY_APPROVED");
    }

    #[test]
    fn test_kyc_admin_edit_forces_rereview() {
        let mut record = KycRecord::new("user-1", sample_kyc_details());
        record.approve("admin-1").unwrap();

        let mut details = sample_kyc_details();
        details.full_name = "Alice K. Kumar".to_string();
        record.admin_edit(details);

        assert_eq!(record.status, KycStatus::Submitted);
        assert_eq!(record.full_name, "Alice K. Kumar");
    }

    #[test]
    fn test_query_conversation() {
        let mut query = SupportQuery::new(
            Some("user-1".to_string()),
            "alice@example.com",
            "Alice",
            "Missing certificate",
            QueryType::Priority,
            "My certificate has not appeared yet.",
        );
        assert_eq!(query.status, QueryStatus::Open);
        assert_eq!(query.messages.len(), 1);

        query.reply("We are looking into it.").unwrap();
        assert_eq!(query.status, QueryStatus::Replied);
        assert_eq!(query.messages.len(), 2);

        query.resolve().unwrap();
        assert_eq!(query.status, QueryStatus::Resolved);
        assert!(query.reply("too late").is_err());
        assert!(query.resolve().is_err());
    }

    #[test]
    fn test_plan_amount_bounds() {
        let plan = InvestmentPlan::new("Gold Saver", "12 month deposit", 10000.0, Some(500000.0), 7.5, 12);
        assert!(plan.accepts_amount(10000.0));
        assert!(plan.accepts_amount(500000.0));
        assert!(!plan.accepts_amount(9999.0));
        assert!(!plan.accepts_amount(500001.0));
    }

    #[test]
    fn test_user_ban_and_reactivate() {
        let mut user = User::new("alice@example.com", "Alice");
        assert_eq!(user.status, UserStatus::Active);
        assert!(!user.is_banned());

        user.ban();
        assert!(user.is_banned());

        user.reactivate();
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn test_feedback_starts_unpublished() {
        let mut feedback = Feedback::new("user-1", "Alice", 4, "Smooth process");
        assert!(!feedback.published);

        feedback.publish();
        assert!(feedback.published);

        feedback.unpublish();
        assert!(!feedback.published);
    }
}

mod authorization_tests {
    use dc_platform::{checks, permissions, AuthContext};
    use std::collections::HashSet;

    fn context_with(scope: &str, perms: &[&str]) -> AuthContext {
        AuthContext {
            principal_id: "principal-1".to_string(),
            scope: scope.to_string(),
            email: Some("admin@example.com".to_string()),
            name: "Admin".to_string(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            roles: vec!["operations-admin".to_string()],
        }
    }

    #[test]
    fn test_require_admin_scope() {
        let admin = context_with("ADMIN", &[]);
        let customer = context_with("CUSTOMER", &[]);

        assert!(checks::require_admin(&admin).is_ok());
        assert!(checks::require_admin(&customer).is_err());
    }

    #[test]
    fn test_order_review_permission() {
        let reviewer = context_with("ADMIN", &[permissions::invest::ORDER_REVIEW]);
        let viewer = context_with("ADMIN", &[permissions::invest::ORDER_VIEW]);

        assert!(checks::can_review_orders(&reviewer).is_ok());
        assert!(checks::can_review_orders(&viewer).is_err());
        assert!(checks::can_view_orders(&viewer).is_ok());
    }

    #[test]
    fn test_kyc_permissions_are_distinct() {
        let reviewer = context_with("ADMIN", &[
            permissions::compliance::KYC_VIEW,
            permissions::compliance::KYC_REVIEW,
        ]);

        assert!(checks::can_view_kyc(&reviewer).is_ok());
        assert!(checks::can_review_kyc(&reviewer).is_ok());
        assert!(checks::can_edit_kyc(&reviewer).is_err());
    }

    #[test]
    fn test_wildcard_permission_grants_category() {
        let ctx = context_with("ADMIN", &["depositcore:invest:*"]);

        assert!(checks::can_view_orders(&ctx).is_ok());
        assert!(checks::can_review_orders(&ctx).is_ok());
        assert!(checks::can_manage_plans(&ctx).is_ok());
        assert!(checks::can_view_kyc(&ctx).is_err());
    }

    #[test]
    fn test_superuser_permission_grants_everything() {
        let ctx = context_with("ADMIN", &[permissions::ADMIN_ALL]);

        assert!(checks::can_view_orders(&ctx).is_ok());
        assert!(checks::can_review_kyc(&ctx).is_ok());
        assert!(checks::can_view_analytics(&ctx).is_ok());
        assert!(checks::can_reply_queries(&ctx).is_ok());
    }

    #[test]
    fn test_customer_with_no_permissions() {
        let ctx = AuthContext {
            principal_id: "user-1".to_string(),
            scope: "CUSTOMER".to_string(),
            email: Some("alice@example.com".to_string()),
            name: "Alice".to_string(),
            permissions: HashSet::new(),
            roles: vec![],
        };

        assert!(checks::can_view_orders(&ctx).is_err());
        assert!(checks::can_view_users(&ctx).is_err());
        assert!(checks::can_view_feedback(&ctx).is_err());
    }
}

mod analytics_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dc_platform::analytics::{monthly_revenue_series, order_status_counts};

    #[test]
    fn test_snapshot_folds_are_deterministic() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 10, 0, 0).single().unwrap();

        let mut active = Order::new("u1", "Alice", "a@example.com", "p1", "Gold", 30000.0, None);
        active.submit_payment("TXN-1".to_string(), None, None).unwrap();
        active.approve(None).unwrap();
        let pending = Order::new("u2", "Bob", "b@example.com", "p1", "Gold", 5000.0, None);
        let orders = vec![active, pending];

        let first = order_status_counts(&orders);
        let second = order_status_counts(&orders);
        assert_eq!(first, second);
        assert_eq!(first.active, 1);
        assert_eq!(first.total_invested, 30000.0);

        assert_eq!(
            monthly_revenue_series(&orders, now),
            monthly_revenue_series(&orders, now)
        );
    }
}

mod tsid_tests {
    use super::*;

    #[test]
    fn test_tsid_format() {
        let id = TsidGenerator::generate();

        // TSID should be 13 characters in Crockford Base32
        assert_eq!(id.len(), 13);
        assert!(id.chars().all(|c| {
            matches!(c, '0'..='9' | 'A'..='H' | 'J'..='K' | 'M'..='N' | 'P'..='T' | 'V'..='Z')
        }));
    }

    #[test]
    fn test_tsid_uniqueness() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| TsidGenerator::generate())
            .collect();

        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_tsid_sortability() {
        let id1 = TsidGenerator::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = TsidGenerator::generate();

        // Newer IDs should sort after older ones lexicographically
        assert!(id2 > id1, "id2 ({}) should be greater than id1 ({})", id2, id1);
    }
}

mod error_tests {
    use dc_platform::PlatformError;
    use dc_platform::usecase::UseCaseError;

    #[test]
    fn test_not_found_display() {
        let err = PlatformError::not_found("Order", "0ABC123DEF456");
        assert_eq!(err.to_string(), "Entity not found: Order with id 0ABC123DEF456");
    }

    #[test]
    fn test_use_case_error_status_codes() {
        assert_eq!(UseCaseError::validation("AMOUNT_REQUIRED", "Amount required").http_status_code(), 400);
        assert_eq!(UseCaseError::business_rule("ORDER_NOT_PENDING", "Wrong state").http_status_code(), 409);
        assert_eq!(UseCaseError::not_found("ORDER_NOT_FOUND", "Missing").http_status_code(), 404);
    }

    #[test]
    fn test_use_case_error_converts_to_platform_error() {
        let err: PlatformError = UseCaseError::validation("AMOUNT_REQUIRED", "Amount required").into();
        assert!(matches!(err, PlatformError::Validation { .. }));

        let err: PlatformError = UseCaseError::business_rule("ORDER_NOT_PENDING", "Wrong state").into();
        assert!(matches!(err, PlatformError::InvalidState { .. }));
    }
}
