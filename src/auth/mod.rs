//! Role authorization over project membership.
//!
//! Answers "does user X have role R on project P" and manages the
//! membership rows behind that answer. Checks are single-row existence
//! queries with no caching; callers run one check per privileged operation.

use crate::error::{Result, TrackerError};
use crate::service::RoleProvider;
use crate::storage::SqliteStorage;
use crate::validation::validate_role;
use std::collections::BTreeMap;
use tracing::debug;

/// Role authorization service over a persistence gateway borrow.
///
/// Construct one per request (or per operation) from a mutable borrow of
/// the store; it holds no state of its own.
pub struct RoleAuthorization<'a> {
    store: &'a mut SqliteStorage,
}

impl<'a> RoleAuthorization<'a> {
    #[must_use]
    pub fn new(store: &'a mut SqliteStorage) -> Self {
        Self { store }
    }

    /// Assign a user to a project in the given role.
    ///
    /// Duplicate assignments are rejected by the storage layer's composite
    /// key, so a concurrent double-assign cannot produce two rows.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAssignment` if the exact assignment already
    /// exists, a validation error for an unusable role name, or a database
    /// error if the insert fails.
    pub fn assign_user(&mut self, project_id: i64, user_id: i64, role: &str) -> Result<()> {
        validate_role(role).map_err(|err| TrackerError::validation(err.field, err.message))?;

        self.store.insert_assignment(project_id, user_id, role)?;
        debug!(project_id, user_id, role, "assigned user to project");
        Ok(())
    }

    /// Remove a user from a project.
    ///
    /// Removes ALL roles the user holds on the project, not just one; the
    /// returned count tells the caller how many rows went away.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove_user(&mut self, project_id: i64, user_id: i64) -> Result<usize> {
        let removed = self.store.delete_assignments(project_id, user_id)?;
        debug!(project_id, user_id, removed, "removed user from project");
        Ok(removed)
    }

    /// True iff the user holds the exact role on the project.
    ///
    /// This is the authorization gate run before privileged operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn user_has_role(&self, project_id: i64, user_id: i64, role: &str) -> Result<bool> {
        self.store.assignment_exists(project_id, user_id, role)
    }

    /// True iff the user holds any role on the project.
    ///
    /// Used to prevent duplicate invitations before choosing a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn is_user_in_project(&self, project_id: i64, user_id: i64) -> Result<bool> {
        self.store.user_in_project(project_id, user_id)
    }

    /// Role names known to the authorization subsystem.
    #[must_use]
    pub fn role_options(provider: &dyn RoleProvider) -> Vec<String> {
        provider.roles()
    }

    /// Current membership of a project as user id -> username.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn project_members(&self, project_id: i64) -> Result<BTreeMap<i64, String>> {
        self.store.project_members(project_id)
    }

    /// All roles the user holds on the project.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn user_roles(&self, project_id: i64, user_id: i64) -> Result<Vec<String>> {
        self.store.user_roles(project_id, user_id)
    }
}
