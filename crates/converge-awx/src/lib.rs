//! # converge-awx — automation controller client
//!
//! Bearer-token client for AWX's `/api/v2/` surface: inventory
//! reconciliation, inventory group/host traversal, job template and
//! credential lookup, job launching, and bounded polling until a launched
//! job reaches a terminal state.
//!
//! ## Modules
//!
//! - `types` — settings, paged envelopes, and wire models
//! - `error` — crate-specific error type
//! - `client` — HTTP transport with bearer auth and pagination
//! - `inventories` — inventory CRUD, traversal, reconciliation
//! - `jobs` — template launch and completion waiting

pub mod client;
pub mod error;
pub mod inventories;
pub mod jobs;
pub mod types;

pub use client::AwxClient;
pub use error::{AwxError, AwxResult};
pub use types::*;
