//! Database schema definitions.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the tracker database.
///
/// Referential integrity policy: deleting a project cascades to its issues,
/// their comments, and its membership rows. Owner/requester references are
/// left unconstrained so user records can be provisioned lazily.
pub const SCHEMA_SQL: &str = r"
    -- Projects
    CREATE TABLE IF NOT EXISTS project (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        create_time TEXT,
        create_user_id INTEGER,
        update_time TEXT,
        update_user_id INTEGER,
        CHECK (length(name) >= 1 AND length(name) <= 255)
    );
    CREATE INDEX IF NOT EXISTS idx_project_name ON project(name);
    CREATE INDEX IF NOT EXISTS idx_project_create_user_id ON project(create_user_id);

    -- Issues
    CREATE TABLE IF NOT EXISTS issue (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        project_id INTEGER NOT NULL,
        type_id INTEGER NOT NULL DEFAULT 2,
        status_id INTEGER NOT NULL DEFAULT 0,
        owner_id INTEGER,
        requester_id INTEGER,
        create_time TEXT,
        create_user_id INTEGER,
        update_time TEXT,
        update_user_id INTEGER,
        CHECK (length(name) >= 1 AND length(name) <= 255),
        FOREIGN KEY (project_id) REFERENCES project(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_issue_project_id ON issue(project_id);
    CREATE INDEX IF NOT EXISTS idx_issue_status_id ON issue(status_id);
    CREATE INDEX IF NOT EXISTS idx_issue_type_id ON issue(type_id);
    CREATE INDEX IF NOT EXISTS idx_issue_owner_id ON issue(owner_id);

    -- Comments
    CREATE TABLE IF NOT EXISTS comment (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id INTEGER NOT NULL,
        content TEXT NOT NULL,
        create_time TEXT,
        create_user_id INTEGER,
        update_time TEXT,
        update_user_id INTEGER,
        FOREIGN KEY (issue_id) REFERENCES issue(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_comment_issue_id ON comment(issue_id);

    -- Users
    CREATE TABLE IF NOT EXISTS user (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT
    );

    -- Project membership. The composite primary key rejects duplicate
    -- (project, user, role) rows at the storage layer.
    CREATE TABLE IF NOT EXISTS project_user_assignment (
        project_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        role TEXT NOT NULL,
        PRIMARY KEY (project_id, user_id, role),
        FOREIGN KEY (project_id) REFERENCES project(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_assignment_user_id ON project_user_assignment(user_id);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Enable foreign keys; cascade deletes depend on this
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;

    Ok(())
}
