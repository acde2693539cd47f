//! Project entity service.

use crate::auth::RoleAuthorization;
use crate::error::{Result, TrackerError, ValidationError};
use crate::model::Project;
use crate::service::{IdentityContext, RoleProvider};
use crate::storage::{ProjectFilters, SqliteStorage};
use crate::validation::ProjectValidator;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Validates, persists, and searches projects, and orchestrates membership
/// changes through the role authorization service.
pub struct ProjectService<'a> {
    store: &'a mut SqliteStorage,
    identity: &'a dyn IdentityContext,
    roles: &'a dyn RoleProvider,
}

impl<'a> ProjectService<'a> {
    #[must_use]
    pub fn new(
        store: &'a mut SqliteStorage,
        identity: &'a dyn IdentityContext,
        roles: &'a dyn RoleProvider,
    ) -> Self {
        Self {
            store,
            identity,
            roles,
        }
    }

    /// Validate a project without touching storage.
    ///
    /// # Errors
    ///
    /// Returns itemized field-level errors for expected invalid input.
    pub fn validate(project: &Project) -> std::result::Result<(), Vec<ValidationError>> {
        ProjectValidator::validate(project)
    }

    /// Persist the project, stamping attribution fields.
    ///
    /// Validation runs before any write. On first save the create stamp is
    /// set and the generated id written back; every save (including an
    /// unchanged re-save) advances the update stamp.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any write, `ProjectNotFound` when
    /// updating a row that no longer exists, or a database error.
    pub fn save(&mut self, project: &mut Project) -> Result<()> {
        ProjectValidator::validate(project).map_err(TrackerError::from_validation_errors)?;

        let now = Utc::now();
        let user_id = self.identity.current_user_id();
        project.update_time = Some(now);
        project.update_user_id = Some(user_id);

        match project.id {
            None => {
                project.create_time = Some(now);
                project.create_user_id = Some(user_id);
                let id = self.store.insert_project(project)?;
                project.id = Some(id);
                info!(project_id = id, name = %project.name, "created project");
            }
            Some(id) => {
                let affected = self.store.update_project(id, project)?;
                if affected == 0 {
                    return Err(TrackerError::ProjectNotFound { id });
                }
                debug!(project_id = id, "updated project");
            }
        }

        Ok(())
    }

    /// Fetch a project by id.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if no row matches, or a database error.
    pub fn get(&self, id: i64) -> Result<Project> {
        self.store
            .get_project(id)?
            .ok_or(TrackerError::ProjectNotFound { id })
    }

    /// Delete a project; issues, comments, and membership rows cascade.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if no row matches, or a database error.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let affected = self.store.delete_project(id)?;
        if affected == 0 {
            return Err(TrackerError::ProjectNotFound { id });
        }
        info!(project_id = id, "deleted project");
        Ok(())
    }

    /// Search projects by filter criteria.
    ///
    /// Results come back in storage order; no ordering is guaranteed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search(&self, filters: &ProjectFilters) -> Result<Vec<Project>> {
        self.store.list_projects(filters)
    }

    // === Membership orchestration ===

    /// Assign a user to this project in a role.
    ///
    /// # Errors
    ///
    /// See [`RoleAuthorization::assign_user`].
    pub fn assign_user(&mut self, project_id: i64, user_id: i64, role: &str) -> Result<()> {
        RoleAuthorization::new(&mut *self.store).assign_user(project_id, user_id, role)
    }

    /// Remove a user (all roles) from this project.
    ///
    /// # Errors
    ///
    /// See [`RoleAuthorization::remove_user`].
    pub fn remove_user(&mut self, project_id: i64, user_id: i64) -> Result<usize> {
        RoleAuthorization::new(&mut *self.store).remove_user(project_id, user_id)
    }

    /// Authorization gate: does the user hold the role on the project?
    ///
    /// Read-only; callers can gate through a shared service borrow.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn user_has_role(&self, project_id: i64, user_id: i64, role: &str) -> Result<bool> {
        self.store.assignment_exists(project_id, user_id, role)
    }

    /// Does the user hold any role on the project?
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn is_user_in_project(&self, project_id: i64, user_id: i64) -> Result<bool> {
        self.store.user_in_project(project_id, user_id)
    }

    // === UI projections ===

    /// Role names available for assignment.
    #[must_use]
    pub fn user_role_options(&self) -> Vec<String> {
        self.roles.roles()
    }

    /// Users currently associated with the project, id -> username.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn user_options(&self, project_id: i64) -> Result<BTreeMap<i64, String>> {
        self.store.project_members(project_id)
    }
}
