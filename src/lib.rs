//! # authgate (client-side session contract)
//!
//! `authgate` decides, on the client side, whether a user is authenticated,
//! persists that decision, attaches the credential to API calls, and reacts
//! when the backend rejects it. The backend issuing tokens is an external
//! collaborator; nothing here hashes passwords or mints tokens.
//!
//! ## Session model
//!
//! Exactly one opaque session token is active per client context. It lives in
//! a [`token::TokenStore`] (the storage analogue) and is mirrored into a
//! cookie so the [`guard`] middleware can make the same decision at request
//! time. The [`auth::AuthService`] keeps both copies in sync.
//!
//! - **Local check:** [`auth::AuthService::is_authenticated`] only looks at the
//!   store. A stale token still reads as present.
//! - **Authoritative check:** [`auth::AuthService::validate_auth`] asks the
//!   backend and drops the local token on any failure.
//!
//! ## Errors
//!
//! Client-side validation failures never reach the network. Transport and
//! rejection errors from login, register and OAuth flows are surfaced with
//! their status so callers can pick the right message; only the logout
//! notification and the verification call are swallowed.

pub mod api;
pub mod auth;
pub mod cli;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod guard;
pub mod navigation;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
