//! Persistence gateway: schema management and the `SQLite` store.

pub mod schema;
mod sqlite;

pub use sqlite::{IssueFilters, ProjectFilters, SqliteStorage};
