//! Notification Entity
//!
//! In-app notifications created by the emitter. The only mutation after
//! insert is flipping the read flag; notifications are never deleted.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Rolling window in which an unread notification counts toward the badge
pub const BADGE_WINDOW_HOURS: i64 = 24;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationSeverity {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationSeverity {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Recipient user ID
    pub user_id: String,

    pub title: String,

    pub message: String,

    pub severity: NotificationSeverity,

    /// Read flag, the only mutable field
    #[serde(default)]
    pub read: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: NotificationSeverity,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            severity,
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }

    /// Whether this notification counts toward the unread badge
    pub fn is_new(&self, now: DateTime<Utc>) -> bool {
        !self.read && now - self.created_at < Duration::hours(BADGE_WINDOW_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new("user-1", "Payment received", "Your payment was confirmed", NotificationSeverity::Success);
        assert!(!n.read);
        assert!(n.is_new(Utc::now()));
    }

    #[test]
    fn test_read_notification_is_not_new() {
        let mut n = Notification::new("user-1", "t", "m", NotificationSeverity::Info);
        n.mark_read();
        assert!(!n.is_new(Utc::now()));
    }

    #[test]
    fn test_old_notification_falls_out_of_badge_window() {
        let mut n = Notification::new("user-1", "t", "m", NotificationSeverity::Info);
        n.created_at = Utc::now() - Duration::hours(BADGE_WINDOW_HOURS + 1);
        assert!(!n.is_new(Utc::now()));
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&NotificationSeverity::Success).unwrap();
        assert_eq!(json, "\"SUCCESS\"");
    }
}
