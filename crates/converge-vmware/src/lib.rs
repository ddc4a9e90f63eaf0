//! # converge-vmware — vCenter tagging client
//!
//! Session-based client for the vCenter CIS REST surface
//! (`https://{host}/rest/com/vmware/cis/...`): tag categories, tags, and
//! tag associations on virtual machines, reconciled against a requested
//! present/absent target.
//!
//! ## Modules
//!
//! - `types` — settings and wire models (categories, tags, VM summaries)
//! - `error` — crate-specific error types
//! - `client` — REST client with session lifecycle (login / logout)
//! - `tags` — category/tag listing, tag create/delete, tag reconciliation
//! - `associations` — attach/detach tag sets on objects with diffing
//! - `vm` — VM lookup by name

pub mod associations;
pub mod client;
pub mod error;
pub mod tags;
pub mod types;
pub mod vm;

pub use client::VmwareClient;
pub use error::{VmwareError, VmwareErrorKind, VmwareResult};
pub use types::*;
