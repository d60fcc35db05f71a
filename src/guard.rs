//! Role-based gating of dashboard routes.
//!
//! Each role owns one dashboard subtree. Anything outside those subtrees is a
//! public page and always renders.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Student => "/student",
            Role::Teacher => "/teacher",
            Role::Admin => "/admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect(String),
}

/// The role whose dashboard contains `path`, if any.
pub fn owner_of(path: &str) -> Option<Role> {
    Role::ALL.into_iter().find(|role| {
        let root = role.dashboard();
        path == root
            || path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

pub fn check(role: Option<Role>, path: &str, sign_in: &str) -> RouteDecision {
    let Some(owner) = owner_of(path) else {
        return RouteDecision::Render;
    };
    match role {
        None => RouteDecision::Redirect(sign_in.to_string()),
        Some(role) if role == owner => RouteDecision::Render,
        Some(role) => RouteDecision::Redirect(role.dashboard().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_pages_always_render() {
        assert_eq!(check(None, "/", "/sign-in"), RouteDecision::Render);
        assert_eq!(check(None, "/courses/rust", "/sign-in"), RouteDecision::Render);
        assert_eq!(check(Some(Role::Admin), "/placements", "/sign-in"), RouteDecision::Render);
    }

    #[test]
    fn anonymous_viewer_is_sent_to_sign_in() {
        assert_eq!(
            check(None, "/student/courses", "/sign-in"),
            RouteDecision::Redirect("/sign-in".into())
        );
    }

    #[test]
    fn wrong_role_goes_to_own_dashboard() {
        assert_eq!(
            check(Some(Role::Student), "/admin/users", "/sign-in"),
            RouteDecision::Redirect("/student".into())
        );
        assert_eq!(
            check(Some(Role::Admin), "/teacher", "/sign-in"),
            RouteDecision::Redirect("/admin".into())
        );
    }

    #[test]
    fn matching_role_renders() {
        assert_eq!(check(Some(Role::Teacher), "/teacher/batches", "/sign-in"), RouteDecision::Render);
    }

    #[test]
    fn prefix_must_end_at_segment_boundary() {
        assert_eq!(owner_of("/students-stories"), None);
        assert_eq!(owner_of("/student"), Some(Role::Student));
    }
}
