//! `SQLite` storage implementation.
//!
//! Row-level reads and writes used by the entity services. Every statement
//! is parameterized; search filters are assembled into a dynamic WHERE
//! clause with boxed parameters. Multi-statement operations are not wrapped
//! in explicit transactions; each call is one statement against the store.

use crate::error::{Result, TrackerError};
use crate::model::{Comment, Issue, Project, User};
use crate::storage::schema::apply_schema;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// SQLite-based persistence gateway.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Search criteria for projects.
///
/// String fields match as substrings; id fields match exactly. `None`
/// fields are not constrained.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilters {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub create_user_id: Option<i64>,
    pub update_user_id: Option<i64>,
}

/// Search criteria for issues within a project.
///
/// The owning project is deliberately not part of the filter struct: issue
/// listings are always project-scoped, and the project id is a separate,
/// mandatory argument to [`SqliteStorage::list_issues`].
#[derive(Debug, Clone, Default)]
pub struct IssueFilters {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub type_id: Option<i64>,
    pub status_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub requester_id: Option<i64>,
    pub create_user_id: Option<i64>,
    pub update_user_id: Option<i64>,
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .as_deref()
        .and_then(parse_datetime))
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        create_time: datetime_column(row, 3)?,
        create_user_id: row.get(4)?,
        update_time: datetime_column(row, 5)?,
        update_user_id: row.get(6)?,
    })
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        project_id: row.get(3)?,
        type_id: row.get(4)?,
        status_id: row.get(5)?,
        owner_id: row.get(6)?,
        requester_id: row.get(7)?,
        create_time: datetime_column(row, 8)?,
        create_user_id: row.get(9)?,
        update_time: datetime_column(row, 10)?,
        update_user_id: row.get(11)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        content: row.get(2)?,
        create_time: datetime_column(row, 3)?,
        create_user_id: row.get(4)?,
        update_time: datetime_column(row, 5)?,
        update_user_id: row.get(6)?,
    })
}

const PROJECT_COLUMNS: &str =
    "id, name, description, create_time, create_user_id, update_time, update_user_id";

const ISSUE_COLUMNS: &str = "id, name, description, project_id, type_id, status_id, \
     owner_id, requester_id, create_time, create_user_id, update_time, update_user_id";

const COMMENT_COLUMNS: &str =
    "id, issue_id, content, create_time, create_user_id, update_time, update_user_id";

impl SqliteStorage {
    /// Open a connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    // === Projects ===

    /// Insert a project row and return the generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_project(&mut self, project: &Project) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO project (name, description, create_time, create_user_id, update_time, update_user_id)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                project.name,
                project.description,
                project.create_time.map(|dt| dt.to_rfc3339()),
                project.create_user_id,
                project.update_time.map(|dt| dt.to_rfc3339()),
                project.update_user_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update a project row; returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_project(&mut self, id: i64, project: &Project) -> Result<usize> {
        let affected = self.conn.execute(
            "UPDATE project SET name = ?, description = ?, update_time = ?, update_user_id = ?
             WHERE id = ?",
            rusqlite::params![
                project.name,
                project.description,
                project.update_time.map(|dt| dt.to_rfc3339()),
                project.update_user_id,
                id,
            ],
        )?;
        Ok(affected)
    }

    /// Get a project by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let result = stmt.query_row([id], project_from_row);

        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a project row; cascades to issues, comments, and membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_project(&mut self, id: i64) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM project WHERE id = ?", [id])?;
        Ok(affected)
    }

    /// List projects matching the filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_projects(&self, filters: &ProjectFilters) -> Result<Vec<Project>> {
        let mut sql = format!("SELECT {PROJECT_COLUMNS} FROM project WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(id) = filters.id {
            sql.push_str(" AND id = ?");
            params.push(Box::new(id));
        }
        if let Some(ref name) = filters.name {
            sql.push_str(" AND name LIKE ?");
            params.push(Box::new(format!("%{name}%")));
        }
        if let Some(ref description) = filters.description {
            sql.push_str(" AND description LIKE ?");
            params.push(Box::new(format!("%{description}%")));
        }
        if let Some(user_id) = filters.create_user_id {
            sql.push_str(" AND create_user_id = ?");
            params.push(Box::new(user_id));
        }
        if let Some(user_id) = filters.update_user_id {
            sql.push_str(" AND update_user_id = ?");
            params.push(Box::new(user_id));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let projects = stmt
            .query_map(params_refs.as_slice(), project_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    // === Issues ===

    /// Insert an issue row and return the generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. the project is missing).
    pub fn insert_issue(&mut self, issue: &Issue) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO issue (
                name, description, project_id, type_id, status_id, owner_id, requester_id,
                create_time, create_user_id, update_time, update_user_id
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                issue.name,
                issue.description,
                issue.project_id,
                issue.type_id,
                issue.status_id,
                issue.owner_id,
                issue.requester_id,
                issue.create_time.map(|dt| dt.to_rfc3339()),
                issue.create_user_id,
                issue.update_time.map(|dt| dt.to_rfc3339()),
                issue.update_user_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an issue row; returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_issue(&mut self, id: i64, issue: &Issue) -> Result<usize> {
        let affected = self.conn.execute(
            "UPDATE issue SET
                name = ?, description = ?, project_id = ?, type_id = ?, status_id = ?,
                owner_id = ?, requester_id = ?, update_time = ?, update_user_id = ?
             WHERE id = ?",
            rusqlite::params![
                issue.name,
                issue.description,
                issue.project_id,
                issue.type_id,
                issue.status_id,
                issue.owner_id,
                issue.requester_id,
                issue.update_time.map(|dt| dt.to_rfc3339()),
                issue.update_user_id,
                id,
            ],
        )?;
        Ok(affected)
    }

    /// Get an issue by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, id: i64) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issue WHERE id = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let result = stmt.query_row([id], issue_from_row);

        match result {
            Ok(issue) => Ok(Some(issue)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an issue row; cascades to its comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_issue(&mut self, id: i64) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM issue WHERE id = ?", [id])?;
        Ok(affected)
    }

    /// List issues in a project matching the filters.
    ///
    /// The project id is a hard constraint applied before any filter; no
    /// criteria combination can widen the result beyond the project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self, project_id: i64, filters: &IssueFilters) -> Result<Vec<Issue>> {
        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issue WHERE project_id = ?");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(project_id)];

        if let Some(id) = filters.id {
            sql.push_str(" AND id = ?");
            params.push(Box::new(id));
        }
        if let Some(ref name) = filters.name {
            sql.push_str(" AND name LIKE ?");
            params.push(Box::new(format!("%{name}%")));
        }
        if let Some(ref description) = filters.description {
            sql.push_str(" AND description LIKE ?");
            params.push(Box::new(format!("%{description}%")));
        }
        if let Some(type_id) = filters.type_id {
            sql.push_str(" AND type_id = ?");
            params.push(Box::new(type_id));
        }
        if let Some(status_id) = filters.status_id {
            sql.push_str(" AND status_id = ?");
            params.push(Box::new(status_id));
        }
        if let Some(owner_id) = filters.owner_id {
            sql.push_str(" AND owner_id = ?");
            params.push(Box::new(owner_id));
        }
        if let Some(requester_id) = filters.requester_id {
            sql.push_str(" AND requester_id = ?");
            params.push(Box::new(requester_id));
        }
        if let Some(user_id) = filters.create_user_id {
            sql.push_str(" AND create_user_id = ?");
            params.push(Box::new(user_id));
        }
        if let Some(user_id) = filters.update_user_id {
            sql.push_str(" AND update_user_id = ?");
            params.push(Box::new(user_id));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let issues = stmt
            .query_map(params_refs.as_slice(), issue_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    // === Comments ===

    /// Insert a comment row and return the generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. the issue is missing).
    pub fn insert_comment(&mut self, comment: &Comment) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO comment (issue_id, content, create_time, create_user_id, update_time, update_user_id)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                comment.issue_id,
                comment.content,
                comment.create_time.map(|dt| dt.to_rfc3339()),
                comment.create_user_id,
                comment.update_time.map(|dt| dt.to_rfc3339()),
                comment.update_user_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get comments for an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_comments(&self, issue_id: i64) -> Result<Vec<Comment>> {
        let sql =
            format!("SELECT {COMMENT_COLUMNS} FROM comment WHERE issue_id = ? ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let comments = stmt
            .query_map([issue_id], comment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Count comments for an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_comments(&self, issue_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM comment WHERE issue_id = ?",
            [issue_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Users ===

    /// Insert a user row and return the generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. duplicate username).
    pub fn insert_user(&mut self, username: &str, email: Option<&str>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO user (username, email) VALUES (?, ?)",
            rusqlite::params![username, email],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, username, email FROM user WHERE id = ?",
            [id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            },
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all users, id ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, email FROM user ORDER BY id ASC")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    // === Membership ===

    /// Insert a membership row.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAssignment` if the (project, user, role) row
    /// already exists, or a database error otherwise (including a foreign
    /// key failure when the project does not exist).
    pub fn insert_assignment(&mut self, project_id: i64, user_id: i64, role: &str) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO project_user_assignment (project_id, user_id, role) VALUES (?, ?, ?)",
            rusqlite::params![project_id, user_id, role],
        );

        // Only key collisions mean "already assigned"; other constraint
        // failures (foreign keys in particular) stay database errors.
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(TrackerError::DuplicateAssignment {
                    project_id,
                    user_id,
                    role: role.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete all membership rows for a (project, user) pair, regardless of
    /// role. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_assignments(&mut self, project_id: i64, user_id: i64) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM project_user_assignment WHERE project_id = ? AND user_id = ?",
            rusqlite::params![project_id, user_id],
        )?;
        Ok(affected)
    }

    /// True iff the exact (project, user, role) row exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn assignment_exists(&self, project_id: i64, user_id: i64, role: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT 1 FROM project_user_assignment
             WHERE project_id = ? AND user_id = ? AND role = ?",
        )?;
        Ok(stmt.exists(rusqlite::params![project_id, user_id, role])?)
    }

    /// True iff the user holds any role on the project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn user_in_project(&self, project_id: i64, user_id: i64) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT 1 FROM project_user_assignment WHERE project_id = ? AND user_id = ?",
        )?;
        Ok(stmt.exists(rusqlite::params![project_id, user_id])?)
    }

    /// Current members of a project as a user id to username mapping.
    ///
    /// Users with multiple roles appear once.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn project_members(&self, project_id: i64) -> Result<BTreeMap<i64, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT u.id, u.username
             FROM project_user_assignment a
             JOIN user u ON u.id = a.user_id
             WHERE a.project_id = ?",
        )?;

        let mut members = BTreeMap::new();
        let rows = stmt.query_map([project_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, username) = row?;
            members.insert(id, username);
        }

        Ok(members)
    }

    /// Roles a user holds on a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn user_roles(&self, project_id: i64, user_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT role FROM project_user_assignment
             WHERE project_id = ? AND user_id = ? ORDER BY role ASC",
        )?;
        let roles = stmt
            .query_map(rusqlite::params![project_id, user_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(roles)
    }

    #[cfg(test)]
    pub(crate) fn raw_query_count(&self, sql: &str) -> i64 {
        self.conn
            .query_row(sql, [], |row| row.get(0))
            .unwrap_or_default()
    }
}
