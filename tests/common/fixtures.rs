//! Entity fixtures for integration tests.

use trackstar::model::{Issue, Project};
use trackstar::service::{FixedIdentity, IssueService, ProjectService, StaticRoleProvider};
use trackstar::storage::SqliteStorage;

pub fn identity() -> FixedIdentity {
    FixedIdentity(1)
}

pub fn roles() -> StaticRoleProvider {
    StaticRoleProvider::new(["owner", "member", "reader"])
}

pub fn project(name: &str) -> Project {
    Project::new(name, format!("{name} description"))
}

/// Save a fresh project and return its id.
pub fn saved_project(store: &mut SqliteStorage, name: &str) -> i64 {
    let identity = identity();
    let provider = roles();
    let mut service = ProjectService::new(store, &identity, &provider);
    let mut project = project(name);
    service.save(&mut project).expect("save project fixture");
    project.id.expect("saved project has id")
}

/// Save a fresh issue in the project and return its id.
pub fn saved_issue(store: &mut SqliteStorage, project_id: i64, name: &str) -> i64 {
    let identity = identity();
    let mut service = IssueService::new(store, &identity);
    let mut issue = Issue::new(project_id, name);
    service.save(&mut issue).expect("save issue fixture");
    issue.id.expect("saved issue has id")
}
