//! Validation helpers for `trackstar`.
//!
//! These routines enforce entity constraints and return structured
//! field-level errors without mutating storage. Rules run in a fixed order
//! and all failures are collected, so a caller sees every broken field in
//! one pass rather than one at a time.

use crate::error::ValidationError;
use crate::model::{Comment, Issue, IssueStatus, IssueType, Project};

/// Maximum length for project and issue names.
pub const MAX_NAME_LEN: usize = 255;

/// Validates project fields.
pub struct ProjectValidator;

impl ProjectValidator {
    /// Validate a project and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(project: &Project) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if project.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "cannot be empty"));
        }
        if project.name.len() > MAX_NAME_LEN {
            errors.push(ValidationError::new("name", "exceeds 255 characters"));
        }

        if project.description.trim().is_empty() {
            errors.push(ValidationError::new("description", "cannot be empty"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Validates issue fields.
pub struct IssueValidator;

impl IssueValidator {
    /// Validate an issue and return all validation errors found.
    ///
    /// `type_id` must name a known [`IssueType`] and `status_id` a known
    /// [`IssueStatus`]; out-of-range stored values are tolerated on read
    /// but rejected on write.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(issue: &Issue) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if issue.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "cannot be empty"));
        }
        if issue.name.len() > MAX_NAME_LEN {
            errors.push(ValidationError::new("name", "exceeds 255 characters"));
        }

        if issue.project_id <= 0 {
            errors.push(ValidationError::new(
                "project_id",
                "must reference a project",
            ));
        }

        if IssueType::from_id(issue.type_id).is_none() {
            errors.push(ValidationError::new("type_id", "must be one of 0, 1, 2"));
        }

        if IssueStatus::from_id(issue.status_id).is_none() {
            errors.push(ValidationError::new("status_id", "must be one of 0, 1, 2"));
        }

        if let Some(owner_id) = issue.owner_id {
            if owner_id <= 0 {
                errors.push(ValidationError::new("owner_id", "must reference a user"));
            }
        }
        if let Some(requester_id) = issue.requester_id {
            if requester_id <= 0 {
                errors.push(ValidationError::new(
                    "requester_id",
                    "must reference a user",
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Validates comment fields.
pub struct CommentValidator;

impl CommentValidator {
    /// Validate a comment and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(comment: &Comment) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if comment.issue_id <= 0 {
            errors.push(ValidationError::new("issue_id", "must reference an issue"));
        }

        if comment.content.trim().is_empty() {
            errors.push(ValidationError::new("content", "cannot be empty"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Validate a role name for membership assignment.
///
/// Role names come from the role provider and are stored verbatim; this
/// only rejects values that could not name any role.
///
/// # Errors
///
/// Returns a `ValidationError` if the role is empty or too long.
pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role.trim().is_empty() {
        return Err(ValidationError::new("role", "cannot be empty"));
    }
    if role.len() > 64 {
        return Err(ValidationError::new("role", "exceeds 64 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_project() -> Project {
        Project::new("Website refresh", "Rebuild the marketing site")
    }

    fn base_issue() -> Issue {
        Issue::new(1, "Fix login redirect")
    }

    #[test]
    fn project_validation_rejects_empty_name() {
        let mut project = base_project();
        project.name = "  ".to_string();

        let errors = ProjectValidator::validate(&project).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "name"));
    }

    #[test]
    fn project_validation_rejects_empty_description() {
        let mut project = base_project();
        project.description = String::new();

        let errors = ProjectValidator::validate(&project).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "description"));
    }

    #[test]
    fn project_validation_rejects_long_name() {
        let mut project = base_project();
        project.name = "x".repeat(256);

        let errors = ProjectValidator::validate(&project).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "name"));
    }

    #[test]
    fn project_validation_accepts_255_char_name() {
        let mut project = base_project();
        project.name = "x".repeat(255);

        assert!(ProjectValidator::validate(&project).is_ok());
    }

    #[test]
    fn issue_validation_rejects_type_out_of_range() {
        let mut issue = base_issue();
        issue.type_id = 3;

        let errors = IssueValidator::validate(&issue).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "type_id"));
    }

    #[test]
    fn issue_validation_rejects_status_out_of_range() {
        let mut issue = base_issue();
        issue.status_id = 99;

        let errors = IssueValidator::validate(&issue).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "status_id"));
    }

    #[test]
    fn issue_validation_rejects_missing_project() {
        let mut issue = base_issue();
        issue.project_id = 0;

        let errors = IssueValidator::validate(&issue).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "project_id"));
    }

    #[test]
    fn issue_validation_collects_multiple_errors() {
        let mut issue = base_issue();
        issue.name = String::new();
        issue.type_id = -1;
        issue.status_id = 7;
        issue.owner_id = Some(0);

        let errors = IssueValidator::validate(&issue).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|err| err.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"type_id"));
        assert!(fields.contains(&"status_id"));
        assert!(fields.contains(&"owner_id"));
    }

    #[test]
    fn comment_validation_rejects_empty_content() {
        let mut comment = Comment::new(" ");
        comment.issue_id = 1;

        let errors = CommentValidator::validate(&comment).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "content"));
    }

    #[test]
    fn comment_validation_rejects_unattached_comment() {
        let comment = Comment::new("looks good");

        let errors = CommentValidator::validate(&comment).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "issue_id"));
    }

    #[test]
    fn role_validation() {
        assert!(validate_role("owner").is_ok());
        assert!(validate_role("").is_err());
        assert!(validate_role(&"r".repeat(65)).is_err());
    }
}
