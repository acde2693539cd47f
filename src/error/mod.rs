//! Error types and handling for `trackstar`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Field-level validation failures are collected into `ValidationError`
//!   values before any write is attempted
//! - Not-found lookups are distinct variants, never conflated with storage
//!   failures
//! - Supports `anyhow` integration for callers that wrap this crate

use thiserror::Error;

/// Primary error type for `trackstar` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Not-found errors ===
    /// Project lookup by id yielded no row.
    #[error("Project not found: {id}")]
    ProjectNotFound { id: i64 },

    /// Issue lookup by id yielded no row.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: i64 },

    /// User lookup by id yielded no row.
    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    // === Validation errors ===
    /// Single field validation failure.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple field validation failures.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Membership errors ===
    /// The (project, user, role) assignment already exists.
    #[error("User {user_id} already has role '{role}' on project {project_id}")]
    DuplicateAssignment {
        project_id: i64,
        user_id: i64,
        role: String,
    },

    // === Storage errors ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Configuration errors ===
    /// Configuration file or environment error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O and format errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error for callers layering additional context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl TrackerError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. }
                | Self::IssueNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::DuplicateAssignment { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateAssignment { .. } => {
                Some("The user already holds this role; remove it first to reassign")
            }
            Self::Validation { .. } | Self::ValidationErrors { .. } => {
                Some("Correct the listed fields and save again")
            }
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create from multiple validation errors.
    ///
    /// A single error collapses to the `Validation` variant so simple cases
    /// stay simple for callers matching on the field.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::ProjectNotFound { id: 42 };
        assert_eq!(err.to_string(), "Project not found: 42");
    }

    #[test]
    fn test_validation_error() {
        let err = TrackerError::validation("name", "cannot be empty");
        assert_eq!(err.to_string(), "Validation failed: name: cannot be empty");
    }

    #[test]
    fn test_single_error_collapses() {
        let err =
            TrackerError::from_validation_errors(vec![ValidationError::new("name", "too long")]);
        match err {
            TrackerError::Validation { field, .. } => assert_eq!(field, "name"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_errors_preserved() {
        let err = TrackerError::from_validation_errors(vec![
            ValidationError::new("name", "cannot be empty"),
            ValidationError::new("description", "cannot be empty"),
        ]);
        match err {
            TrackerError::ValidationErrors { errors } => assert_eq!(errors.len(), 2),
            other => panic!("expected ValidationErrors, got {other:?}"),
        }
    }

    #[test]
    fn test_user_recoverable() {
        assert!(TrackerError::IssueNotFound { id: 7 }.is_user_recoverable());

        let not_recoverable = TrackerError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            None,
        ));
        assert!(!not_recoverable.is_user_recoverable());
    }

    #[test]
    fn test_validation_error_struct() {
        let err = ValidationError::new("type_id", "must be one of 0, 1, 2");
        assert_eq!(err.to_string(), "type_id: must be one of 0, 1, 2");
    }
}
