use crate::model::{LessonPosition, SubscriptionState};

/// Everything the access decision depends on, already fetched.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub subscription: SubscriptionState,
    pub purchased_course_ids: &'a [String],
    pub course_id: &'a str,
    pub position: LessonPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// The first video of the first chapter is the free preview lesson.
pub fn is_free_lesson(position: LessonPosition) -> bool {
    position == LessonPosition::FIRST
}

pub fn decide(req: &AccessRequest<'_>) -> AccessDecision {
    if is_free_lesson(req.position)
        || req.subscription == SubscriptionState::Subscribed
        || req.purchased_course_ids.iter().any(|id| id == req.course_id)
    {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(
        subscription: SubscriptionState,
        purchased: &'a [String],
        chapter: usize,
        video: usize,
    ) -> AccessRequest<'a> {
        AccessRequest {
            subscription,
            purchased_course_ids: purchased,
            course_id: "rust-101",
            position: LessonPosition::new(chapter, video),
        }
    }

    #[test]
    fn first_lesson_is_always_allowed() {
        for sub in [SubscriptionState::Free, SubscriptionState::Subscribed] {
            assert_eq!(decide(&request(sub, &[], 0, 0)), AccessDecision::Allow);
        }
    }

    #[test]
    fn free_viewer_without_purchase_is_denied() {
        assert_eq!(decide(&request(SubscriptionState::Free, &[], 0, 1)), AccessDecision::Deny);
        assert_eq!(decide(&request(SubscriptionState::Free, &[], 1, 0)), AccessDecision::Deny);
    }

    #[test]
    fn purchase_of_other_course_does_not_count() {
        let purchased = vec!["go-101".to_string()];
        assert_eq!(
            decide(&request(SubscriptionState::Free, &purchased, 2, 3)),
            AccessDecision::Deny
        );
    }

    #[test]
    fn subscription_or_purchase_unlocks() {
        assert!(decide(&request(SubscriptionState::Subscribed, &[], 3, 2)).is_allowed());
        let purchased = vec!["rust-101".to_string()];
        assert!(decide(&request(SubscriptionState::Free, &purchased, 3, 2)).is_allowed());
    }
}
