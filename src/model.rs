use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guard::Role;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    #[default]
    Free,
    Subscribed,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Free => "free",
            SubscriptionState::Subscribed => "subscribed",
        }
    }
}

/// Viewer account as returned by the account endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub subscription: SubscriptionState,
    #[serde(default)]
    pub purchased_courses: Vec<String>,
    #[serde(default)]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl Account {
    /// Effective subscription at `now`; a lapsed subscription counts as free.
    pub fn subscription_at(&self, now: DateTime<Utc>) -> SubscriptionState {
        match (self.subscription, self.subscription_expires_at) {
            (SubscriptionState::Subscribed, Some(expires)) if expires <= now => {
                SubscriptionState::Free
            }
            (state, _) => state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chapter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Course {
    pub fn videos(&self) -> impl Iterator<Item = &Video> {
        self.chapters.iter().flat_map(|c| c.videos.iter())
    }
}

/// Zero-based (chapter, video-within-chapter) coordinates of a lesson.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct LessonPosition {
    pub chapter: usize,
    pub video: usize,
}

impl LessonPosition {
    pub const FIRST: LessonPosition = LessonPosition { chapter: 0, video: 0 };

    pub fn new(chapter: usize, video: usize) -> Self {
        Self { chapter, video }
    }
}

/// Per-(viewer, video) progress record. A newer submission replaces the old one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgressEntry {
    pub course_id: String,
    pub video_id: String,
    pub watched_percent: f64,
    pub last_watched_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn account_deserializes_from_wire() {
        let json = r#"{
            "subscription": "subscribed",
            "purchasedCourses": ["rust-101"],
            "subscriptionExpiresAt": "2030-01-01T00:00:00Z",
            "role": "student"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.subscription, SubscriptionState::Subscribed);
        assert_eq!(account.purchased_courses, vec!["rust-101".to_string()]);
        assert_eq!(account.subscription.as_str(), "subscribed");
        assert_eq!(account.role, Some(Role::Student));
    }

    #[test]
    fn missing_account_fields_default_to_free() {
        let account: Account = serde_json::from_str("{}").unwrap();
        assert_eq!(account.subscription.as_str(), "free");
        assert!(account.purchased_courses.is_empty());
        assert!(account.role.is_none());
    }

    #[test]
    fn lapsed_subscription_is_free() {
        let now = Utc::now();
        let mut account = Account {
            subscription: SubscriptionState::Subscribed,
            subscription_expires_at: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(account.subscription_at(now), SubscriptionState::Free);

        account.subscription_expires_at = Some(now + Duration::days(1));
        assert_eq!(account.subscription_at(now), SubscriptionState::Subscribed);

        account.subscription_expires_at = None;
        assert_eq!(account.subscription_at(now), SubscriptionState::Subscribed);
    }

    #[test]
    fn progress_entry_serializes_camel_case() {
        let entry = WatchProgressEntry {
            course_id: "c1".into(),
            video_id: "v1".into(),
            watched_percent: 42.5,
            last_watched_time: 17,
            updated_at: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["courseId"], "c1");
        assert_eq!(value["videoId"], "v1");
        assert_eq!(value["watchedPercent"], 42.5);
        assert_eq!(value["lastWatchedTime"], 17);
        assert!(value.get("updatedAt").is_none());
    }
}
