//! Entity services: validate, persist, and search projects and issues.
//!
//! Services are constructed per request from explicit collaborators: a
//! mutable borrow of the persistence gateway, an [`IdentityContext`] for
//! attribution stamps, and (for projects) a [`RoleProvider`] for the role
//! vocabulary. Nothing here reaches for ambient globals.

mod issue;
mod project;

pub use issue::IssueService;
pub use project::ProjectService;

/// Source of the current authenticated user's id.
///
/// Implemented by the host application (session, token, ...). The services
/// only ever read the id, at save time, for attribution stamps.
pub trait IdentityContext {
    fn current_user_id(&self) -> i64;
}

/// A fixed identity, for tests and batch jobs acting as one user.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity(pub i64);

impl IdentityContext for FixedIdentity {
    fn current_user_id(&self) -> i64 {
        self.0
    }
}

/// Enumerates role names known to the access-control subsystem.
pub trait RoleProvider {
    fn roles(&self) -> Vec<String>;
}

/// Role provider backed by a configured list of names.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleProvider {
    roles: Vec<String>,
}

impl StaticRoleProvider {
    #[must_use]
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl RoleProvider for StaticRoleProvider {
    fn roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_identity_returns_configured_id() {
        let identity = FixedIdentity(42);
        assert_eq!(identity.current_user_id(), 42);
    }

    #[test]
    fn static_role_provider_preserves_order() {
        let provider = StaticRoleProvider::new(["owner", "member"]);
        assert_eq!(provider.roles(), vec!["owner", "member"]);
    }
}
