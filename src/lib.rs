//! Project and issue tracking core.
//!
//! `trackstar` implements the data-access and authorization layer of a
//! project/issue tracker: entity services with field-level validation,
//! role-based project membership, and an SQLite persistence gateway.
//!
//! The crate deliberately stops at the service boundary. Request routing,
//! rendering, and authentication live in whatever host application embeds
//! this crate; the host supplies the current user through
//! [`service::IdentityContext`] and the known role names through
//! [`service::RoleProvider`].
//!
//! # Layout
//!
//! - [`model`] - plain data structs and the type/status enumerations
//! - [`validation`] - per-entity validators producing field-level errors
//! - [`storage`] - SQLite persistence gateway and search filters
//! - [`auth`] - role authorization over project membership rows
//! - [`service`] - project and issue entity services (validate, save, search)
//! - [`config`] - settings loaded from YAML and environment
//! - [`logging`] - tracing subscriber initialization
//! - [`error`] - structured error types

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod validation;

pub use error::{Result, TrackerError, ValidationError};
