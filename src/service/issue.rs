//! Issue entity service.

use crate::error::{Result, TrackerError, ValidationError};
use crate::model::{Comment, Issue};
use crate::service::IdentityContext;
use crate::storage::{IssueFilters, SqliteStorage};
use crate::validation::{CommentValidator, IssueValidator};
use chrono::Utc;
use tracing::{debug, info};

/// Validates, persists, and searches issues scoped to a project.
pub struct IssueService<'a> {
    store: &'a mut SqliteStorage,
    identity: &'a dyn IdentityContext,
}

impl<'a> IssueService<'a> {
    #[must_use]
    pub fn new(store: &'a mut SqliteStorage, identity: &'a dyn IdentityContext) -> Self {
        Self { store, identity }
    }

    /// Validate an issue without touching storage.
    ///
    /// # Errors
    ///
    /// Returns itemized field-level errors for expected invalid input.
    pub fn validate(issue: &Issue) -> std::result::Result<(), Vec<ValidationError>> {
        IssueValidator::validate(issue)
    }

    /// Persist the issue, stamping attribution fields.
    ///
    /// Same semantics as project save: validation first, create stamp on
    /// first save, update stamp on every save.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any write, `IssueNotFound` when
    /// updating a row that no longer exists, or a database error (for
    /// example when `project_id` references no project).
    pub fn save(&mut self, issue: &mut Issue) -> Result<()> {
        IssueValidator::validate(issue).map_err(TrackerError::from_validation_errors)?;

        let now = Utc::now();
        let user_id = self.identity.current_user_id();
        issue.update_time = Some(now);
        issue.update_user_id = Some(user_id);

        match issue.id {
            None => {
                issue.create_time = Some(now);
                issue.create_user_id = Some(user_id);
                let id = self.store.insert_issue(issue)?;
                issue.id = Some(id);
                info!(issue_id = id, project_id = issue.project_id, "created issue");
            }
            Some(id) => {
                let affected = self.store.update_issue(id, issue)?;
                if affected == 0 {
                    return Err(TrackerError::IssueNotFound { id });
                }
                debug!(issue_id = id, "updated issue");
            }
        }

        Ok(())
    }

    /// Fetch an issue by id.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if no row matches, or a database error.
    pub fn get(&self, id: i64) -> Result<Issue> {
        self.store
            .get_issue(id)?
            .ok_or(TrackerError::IssueNotFound { id })
    }

    /// Delete an issue; its comments cascade.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if no row matches, or a database error.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let affected = self.store.delete_issue(id)?;
        if affected == 0 {
            return Err(TrackerError::IssueNotFound { id });
        }
        info!(issue_id = id, "deleted issue");
        Ok(())
    }

    /// Search issues within one project.
    ///
    /// The project scope is a hard constraint: whatever else the filters
    /// say, only rows with the given `project_id` come back. Results come
    /// back in storage order; no ordering is guaranteed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search(&self, project_id: i64, filters: &IssueFilters) -> Result<Vec<Issue>> {
        self.store.list_issues(project_id, filters)
    }

    /// Attach a comment to a saved issue and persist it.
    ///
    /// Sets `comment.issue_id` from the issue, stamps attribution, and
    /// writes the generated id back into the comment.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the issue is unsaved or the comment
    /// body is empty, or a database error if the insert fails.
    pub fn add_comment(&mut self, issue: &Issue, comment: &mut Comment) -> Result<()> {
        let issue_id = issue
            .id
            .ok_or_else(|| TrackerError::validation("issue_id", "issue has not been saved"))?;
        comment.issue_id = issue_id;

        CommentValidator::validate(comment).map_err(TrackerError::from_validation_errors)?;

        let now = Utc::now();
        let user_id = self.identity.current_user_id();
        comment.create_time = Some(now);
        comment.create_user_id = Some(user_id);
        comment.update_time = Some(now);
        comment.update_user_id = Some(user_id);

        let id = self.store.insert_comment(comment)?;
        comment.id = Some(id);
        debug!(issue_id, comment_id = id, "added comment");
        Ok(())
    }

    /// Comments on an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn comments(&self, issue_id: i64) -> Result<Vec<Comment>> {
        self.store.get_comments(issue_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueStatus, IssueType, Project};
    use crate::service::FixedIdentity;

    fn fixture() -> (SqliteStorage, FixedIdentity, i64) {
        let mut store = SqliteStorage::open_memory().unwrap();
        let project = Project {
            id: None,
            name: "Host project".to_string(),
            description: "holds issues".to_string(),
            create_time: Some(Utc::now()),
            create_user_id: Some(1),
            update_time: Some(Utc::now()),
            update_user_id: Some(1),
        };
        let project_id = store.insert_project(&project).unwrap();
        (store, FixedIdentity(3), project_id)
    }

    #[test]
    fn save_stamps_and_assigns_id() {
        let (mut store, identity, project_id) = fixture();
        let mut service = IssueService::new(&mut store, &identity);

        let mut issue = Issue::new(project_id, "First issue");
        issue.type_id = IssueType::Bug.id();
        issue.status_id = IssueStatus::Started.id();
        service.save(&mut issue).unwrap();

        assert!(issue.id.is_some());
        assert_eq!(issue.create_user_id, Some(3));
        assert_eq!(issue.update_user_id, Some(3));
    }

    #[test]
    fn save_rejects_out_of_range_status() {
        let (mut store, identity, project_id) = fixture();
        let mut service = IssueService::new(&mut store, &identity);

        let mut issue = Issue::new(project_id, "Bad status");
        issue.status_id = 9;
        let err = service.save(&mut issue).unwrap_err();
        match err {
            TrackerError::Validation { field, .. } => assert_eq!(field, "status_id"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(issue.id.is_none());
    }

    #[test]
    fn add_comment_sets_issue_id_and_persists() {
        let (mut store, identity, project_id) = fixture();
        let mut service = IssueService::new(&mut store, &identity);

        let mut issue = Issue::new(project_id, "Commented");
        service.save(&mut issue).unwrap();

        let mut comment = Comment::new("ship it");
        service.add_comment(&issue, &mut comment).unwrap();

        assert_eq!(comment.issue_id, issue.id.unwrap());
        assert!(comment.id.is_some());
        assert_eq!(comment.create_user_id, Some(3));

        let listed = service.comments(issue.id.unwrap()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "ship it");
    }

    #[test]
    fn add_comment_to_unsaved_issue_fails() {
        let (mut store, identity, project_id) = fixture();
        let mut service = IssueService::new(&mut store, &identity);

        let issue = Issue::new(project_id, "Never saved");
        let mut comment = Comment::new("orphan");
        let err = service.add_comment(&issue, &mut comment).unwrap_err();
        assert!(matches!(err, TrackerError::Validation { .. }));
    }

    #[test]
    fn delete_missing_issue_is_not_found() {
        let (mut store, identity, _project_id) = fixture();
        let mut service = IssueService::new(&mut store, &identity);
        assert!(matches!(
            service.delete(404).unwrap_err(),
            TrackerError::IssueNotFound { id: 404 }
        ));
    }
}
