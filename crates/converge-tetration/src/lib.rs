//! # converge-tetration — legacy web-UI backend session client
//!
//! This collaborator has no JSON token endpoint: authentication is the
//! browser flow — fetch the sign-in form, scrape the Rails
//! `authenticity_token`, post the form, and keep the session cookie. Every
//! JSON call after that carries an `X-CSRF-Token` header refreshed from the
//! application page's `<meta>` tag.
//!
//! ## Modules
//!
//! - `types` — settings, current-user document, preference envelopes
//! - `error` — crate-specific error type
//! - `client` — session lifecycle, CSRF handling, scope switching

pub mod client;
pub mod error;
pub mod types;

pub use client::TetClient;
pub use error::{TetError, TetErrorKind, TetResult};
pub use types::*;
