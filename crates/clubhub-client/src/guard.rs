//! Role-based route guarding.

use crate::session::identity::{Identity, Role};

pub const LOGIN_PATH: &str = "/login";

/// Outcome of guarding a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the guarded content unchanged.
    Render,
    RedirectToLogin,
    /// Send the principal to their own landing surface.
    RedirectTo(&'static str),
}

impl GuardDecision {
    /// Target path, `None` when the content renders.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match *self {
            GuardDecision::Render => None,
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectTo(path) => Some(path),
        }
    }
}

/// Landing surface for a role.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Member => "/member/dashboard",
        Role::Coach => "/coach/dashboard",
        Role::Admin => "/admin/dashboard",
        Role::Superadmin => "/superadmin/dashboard",
    }
}

/// Declarative guard over a set of required roles.
///
/// An empty set admits any authenticated principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuard {
    required: Vec<Role>,
}

impl RouteGuard {
    pub fn new(required: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required: required.into_iter().collect(),
        }
    }

    pub fn required(&self) -> &[Role] {
        &self.required
    }

    pub fn evaluate(&self, identity: Option<&Identity>) -> GuardDecision {
        let Some(identity) = identity else {
            return GuardDecision::RedirectToLogin;
        };
        if self.required.is_empty() || self.required.contains(&identity.role) {
            GuardDecision::Render
        } else {
            GuardDecision::RedirectTo(landing_path(identity.role))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::identity::avatar_for;

    fn identity(role: Role, roles: Vec<Role>) -> Identity {
        Identity {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "Alex".to_string(),
            avatar: avatar_for("a@b.com"),
            role,
            roles,
            permissions: Vec::new(),
            is_admin: false,
            phone: None,
            status: None,
            branch_id: None,
        }
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        let guard = RouteGuard::new([Role::Member]);
        assert_eq!(guard.evaluate(None), GuardDecision::RedirectToLogin);
        assert_eq!(guard.evaluate(None).redirect_path(), Some("/login"));
    }

    #[test]
    fn test_active_role_decides_not_held_roles() {
        let guard = RouteGuard::new([Role::Admin, Role::Superadmin]);
        let coach = identity(Role::Coach, vec![Role::Coach, Role::Admin]);
        assert_eq!(
            guard.evaluate(Some(&coach)),
            GuardDecision::RedirectTo("/coach/dashboard")
        );

        let admin = identity(Role::Admin, vec![Role::Coach, Role::Admin]);
        assert_eq!(guard.evaluate(Some(&admin)), GuardDecision::Render);
    }

    #[test]
    fn test_empty_requirement_admits_any_principal() {
        let guard = RouteGuard::default();
        let member = identity(Role::Member, vec![Role::Member]);
        assert_eq!(guard.evaluate(Some(&member)), GuardDecision::Render);
        assert_eq!(guard.evaluate(Some(&member)).redirect_path(), None);
    }
}
