//! Core data types for `trackstar`.
//!
//! This module defines the entities managed by the services:
//! - `Project` - a container for issues with role-based membership
//! - `Issue` - the core work item, always scoped to one project
//! - `Comment` - free-text note attached to an issue
//! - `User` - minimal identity record for attribution and membership
//! - `ProjectAssignment` - a (project, user, role) membership row
//!
//! Issues carry their `type_id`/`status_id` as raw integers because stale
//! rows may hold values outside the known enumerations; the typed accessors
//! and label helpers handle that defensively instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Issue type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    Feature,
    #[default]
    Task,
}

impl IssueType {
    /// All known types, in stored-id order.
    pub const ALL: [Self; 3] = [Self::Bug, Self::Feature, Self::Task];

    /// The integer stored in the `type_id` column.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Bug => 0,
            Self::Feature => 1,
            Self::Task => 2,
        }
    }

    /// Resolve a stored `type_id`, if it names a known type.
    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Bug),
            1 => Some(Self::Feature),
            2 => Some(Self::Task),
            _ => None,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::Feature => "Feature",
            Self::Task => "Task",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            other => Err(crate::error::TrackerError::validation(
                "type_id",
                format!("unknown issue type '{other}'"),
            )),
        }
    }
}

/// Issue lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    NotStarted,
    Started,
    Finished,
}

impl IssueStatus {
    /// All known statuses, in stored-id order.
    pub const ALL: [Self; 3] = [Self::NotStarted, Self::Started, Self::Finished];

    /// The integer stored in the `status_id` column.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::NotStarted => 0,
            Self::Started => 1,
            Self::Finished => 2,
        }
    }

    /// Resolve a stored `status_id`, if it names a known status.
    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::NotStarted),
            1 => Some(Self::Started),
            2 => Some(Self::Finished),
            _ => None,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not yet started",
            Self::Started => "Started",
            Self::Finished => "Finished",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not_started" | "notstarted" => Ok(Self::NotStarted),
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            other => Err(crate::error::TrackerError::validation(
                "status_id",
                format!("unknown issue status '{other}'"),
            )),
        }
    }
}

/// A project: the container that owns issues and carries membership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Project {
    /// Row id; `None` until first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Display name (1-255 chars).
    pub name: String,

    /// Free-text description; required, non-empty.
    pub description: String,

    /// Stamped on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_user_id: Option<i64>,

    /// Stamped on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user_id: Option<i64>,
}

impl Project {
    /// Convenience constructor for a fresh, unsaved project.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// The primary work item, scoped to exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Row id; `None` until first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Display name (1-255 chars).
    pub name: String,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning project. Required; every read and search is scoped to it.
    pub project_id: i64,

    /// Raw stored type; see [`IssueType::from_id`].
    pub type_id: i64,

    /// Raw stored status; see [`IssueStatus::from_id`].
    pub status_id: i64,

    /// Assigned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,

    /// User who requested the work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user_id: Option<i64>,
}

impl Issue {
    /// Convenience constructor for a fresh, unsaved issue.
    #[must_use]
    pub fn new(project_id: i64, name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            project_id,
            type_id: IssueType::default().id(),
            status_id: IssueStatus::default().id(),
            owner_id: None,
            requester_id: None,
            create_time: None,
            create_user_id: None,
            update_time: None,
            update_user_id: None,
        }
    }

    /// Typed view of `type_id`, if it is a known type.
    #[must_use]
    pub const fn issue_type(&self) -> Option<IssueType> {
        IssueType::from_id(self.type_id)
    }

    /// Typed view of `status_id`, if it is a known status.
    #[must_use]
    pub const fn status(&self) -> Option<IssueStatus> {
        IssueStatus::from_id(self.status_id)
    }

    /// Display label for the stored type.
    ///
    /// Out-of-range values are rendered, not rejected; stale rows must
    /// still display.
    #[must_use]
    pub fn type_text(&self) -> String {
        self.issue_type().map_or_else(
            || format!("unknown type ({})", self.type_id),
            |t| t.label().to_string(),
        )
    }

    /// Display label for the stored status, with the same fallback rule.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.status().map_or_else(
            || format!("unknown status ({})", self.status_id),
            |s| s.label().to_string(),
        )
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Row id; `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning issue; set by `IssueService::add_comment`.
    pub issue_id: i64,

    /// Comment body; required, non-empty.
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user_id: Option<i64>,
}

impl Comment {
    /// Convenience constructor for an unattached comment.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            issue_id: 0,
            content: content.into(),
            create_time: None,
            create_user_id: None,
            update_time: None,
            update_user_id: None,
        }
    }
}

/// Minimal identity record used for attribution and membership display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A (project, user, role) membership row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectAssignment {
    pub project_id: i64,
    pub user_id: i64,
    pub role: String,
}
