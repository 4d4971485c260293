//! Feedback Entity
//!
//! User testimonials. Only entries an admin has published appear on the
//! public landing page.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Feedback entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub user_id: String,
    pub user_name: String,

    /// Star rating, 1 to 5
    pub rating: i32,

    pub message: String,

    /// Visible on the public list once an admin publishes it
    #[serde(default)]
    pub published: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        rating: i32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            rating,
            message: message.into(),
            published: false,
            created_at: Utc::now(),
        }
    }

    pub fn publish(&mut self) {
        self.published = true;
    }

    pub fn unpublish(&mut self) {
        self.published = false;
    }
}

/// Whether a rating is within the accepted star range
pub fn rating_in_range(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feedback_is_unpublished() {
        let f = Feedback::new("user-1", "Alice", 5, "Great rates");
        assert!(!f.published);
        assert_eq!(f.rating, 5);
    }

    #[test]
    fn test_rating_range() {
        assert!(rating_in_range(1));
        assert!(rating_in_range(5));
        assert!(!rating_in_range(0));
        assert!(!rating_in_range(6));
    }
}
