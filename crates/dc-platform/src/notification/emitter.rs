//! Notification Emitter
//!
//! Single entry point for creating notifications. Emission is best-effort:
//! the emitter returns the insert Result and callers decide what to do with
//! a failure (order/KYC/query flows log a warning and continue).

use std::sync::Arc;
use tracing::debug;

use crate::notification::entity::{Notification, NotificationSeverity};
use crate::notification::repository::NotificationRepository;
use crate::shared::error::Result;

#[derive(Clone)]
pub struct NotificationEmitter {
    repo: Arc<NotificationRepository>,
}

impl NotificationEmitter {
    pub fn new(repo: Arc<NotificationRepository>) -> Self {
        Self { repo }
    }

    /// Insert a single notification. No retry, no ordering guarantee.
    pub async fn emit(
        &self,
        user_id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: NotificationSeverity,
    ) -> Result<Notification> {
        let notification = Notification::new(user_id, title, message, severity);
        self.repo.insert(&notification).await?;

        debug!(
            notification_id = %notification.id,
            user_id = %user_id,
            severity = ?severity,
            "Notification emitted"
        );

        Ok(notification)
    }

    /// Payment approved by an admin
    pub async fn payment_received(
        &self,
        user_id: &str,
        plan_name: &str,
        amount: f64,
    ) -> Result<Notification> {
        let (title, message) = payment_received_content(plan_name, amount);
        self.emit(user_id, title, message, NotificationSeverity::Success).await
    }

    /// Payment rejected by an admin
    pub async fn payment_rejected(
        &self,
        user_id: &str,
        plan_name: &str,
        admin_note: Option<&str>,
    ) -> Result<Notification> {
        let (title, message) = payment_rejected_content(plan_name, admin_note);
        self.emit(user_id, title, message, NotificationSeverity::Error).await
    }

    /// KYC approved or rejected
    pub async fn kyc_status_changed(
        &self,
        user_id: &str,
        approved: bool,
        rejection_reason: Option<&str>,
    ) -> Result<Notification> {
        let (title, message, severity) = kyc_status_content(approved, rejection_reason);
        self.emit(user_id, title, message, severity).await
    }

    /// Investment certificate attached to an order
    pub async fn certificate_issued(
        &self,
        user_id: &str,
        plan_name: &str,
    ) -> Result<Notification> {
        let (title, message) = certificate_issued_content(plan_name);
        self.emit(user_id, title, message, NotificationSeverity::Info).await
    }

    /// Admin replied to a support query
    pub async fn query_replied(
        &self,
        user_id: &str,
        subject: &str,
    ) -> Result<Notification> {
        let (title, message) = query_replied_content(subject);
        self.emit(user_id, title, message, NotificationSeverity::Info).await
    }
}

fn payment_received_content(plan_name: &str, amount: f64) -> (String, String) {
    (
        "Payment received".to_string(),
        format!(
            "Your payment of {:.2} for the {} plan has been confirmed. Your investment is now active.",
            amount, plan_name
        ),
    )
}

fn payment_rejected_content(plan_name: &str, admin_note: Option<&str>) -> (String, String) {
    let message = match admin_note {
        Some(note) if !note.trim().is_empty() => format!(
            "Your payment for the {} plan could not be verified: {}",
            plan_name, note.trim()
        ),
        _ => format!(
            "Your payment for the {} plan could not be verified. Please contact support.",
            plan_name
        ),
    };
    ("Payment rejected".to_string(), message)
}

fn kyc_status_content(
    approved: bool,
    rejection_reason: Option<&str>,
) -> (String, String, NotificationSeverity) {
    if approved {
        (
            "KYC approved".to_string(),
            "Your KYC verification is complete. You can now invest without limits.".to_string(),
            NotificationSeverity::Success,
        )
    } else {
        let message = match rejection_reason {
            Some(reason) if !reason.trim().is_empty() => {
                format!("Your KYC submission was rejected: {}. Please resubmit your documents.", reason.trim())
            }
            _ => "Your KYC submission was rejected. Please resubmit your documents.".to_string(),
        };
        ("KYC rejected".to_string(), message, NotificationSeverity::Error)
    }
}

fn certificate_issued_content(plan_name: &str) -> (String, String) {
    (
        "Certificate issued".to_string(),
        format!("Your investment certificate for the {} plan is ready to download.", plan_name),
    )
}

fn query_replied_content(subject: &str) -> (String, String) {
    (
        "Support reply".to_string(),
        format!("Our team replied to your query \"{}\".", subject),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_received_content() {
        let (title, message) = payment_received_content("Gold Saver", 50000.0);
        assert_eq!(title, "Payment received");
        assert!(message.contains("50000.00"));
        assert!(message.contains("Gold Saver"));
    }

    #[test]
    fn test_payment_rejected_includes_note() {
        let (_, message) = payment_rejected_content("Gold Saver", Some("transaction not found"));
        assert!(message.contains("transaction not found"));

        let (_, fallback) = payment_rejected_content("Gold Saver", None);
        assert!(fallback.contains("contact support"));
    }

    #[test]
    fn test_kyc_status_content_severity() {
        let (_, _, approved_severity) = kyc_status_content(true, None);
        assert_eq!(approved_severity, NotificationSeverity::Success);

        let (_, message, rejected_severity) = kyc_status_content(false, Some("blurry document"));
        assert_eq!(rejected_severity, NotificationSeverity::Error);
        assert!(message.contains("blurry document"));
    }

    #[test]
    fn test_query_replied_content() {
        let (title, message) = query_replied_content("Withdrawal question");
        assert_eq!(title, "Support reply");
        assert!(message.contains("Withdrawal question"));
    }
}
