//! # converge-core — shared building blocks for the vendor clients
//!
//! Every `converge-*` vendor crate reconciles a requested desired state
//! (present/absent) against what the remote management plane currently
//! holds, issuing the minimal create/delete calls to converge. This crate
//! carries the pieces that are identical across vendors:
//!
//! - `state` — the desired-state enum and the `{changed, object}` outcome
//!   every operation reports
//! - `reconcile` — the create/delete/nothing planner and its set-membership
//!   variant for permission grants
//! - `provider` — connection settings resolution with per-vendor
//!   environment-variable fallbacks and shared defaults

pub mod provider;
pub mod reconcile;
pub mod state;

pub use provider::{env_fallback, warn_insecure, SettingsError};
pub use reconcile::Action;
pub use state::{DesiredState, Outcome};
