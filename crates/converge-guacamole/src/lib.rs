//! # converge-guacamole — Apache Guacamole gateway client
//!
//! Declarative management of an Apache Guacamole remote-desktop gateway:
//! each entry point logs in, fetches current state, diffs it against the
//! requested present/absent target, issues the minimal create/delete call,
//! and logs out again.
//!
//! ## Modules
//!
//! - `types` — settings and wire models (users, connections, groups, permissions)
//! - `error` — crate-specific error type
//! - `client` — HTTP transport with token authentication
//! - `tree` — connection-group tree walk and path→identifier resolution
//! - `users` — user accounts
//! - `connections` — connections (ssh/rdp/xrdp parameter presets)
//! - `groups` — connection groups with hierarchical path handling
//! - `user_groups` — user groups
//! - `permissions` — per-user connection permission grants

pub mod client;
pub mod connections;
pub mod error;
pub mod groups;
pub mod permissions;
pub mod tree;
pub mod types;
pub mod user_groups;
pub mod users;

pub use client::GuacClient;
pub use error::{GuacError, GuacResult};
pub use types::*;
