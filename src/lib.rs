//! # authsession (client-side auth sessions)
//!
//! `authsession` drives the client half of a cookie-backed auth protocol:
//! register, login, refresh and logout against a remote service, and the
//! session state that follows each outcome.
//!
//! ## Layers
//!
//! - **Transport** ([`api`]): a thin wrapper over `reqwest` that joins paths
//!   onto a configured base origin, attaches the ambient cookie store and
//!   reduces every HTTP exchange to `{status, data}`. Only network faults are
//!   errors; 4xx/5xx are ordinary results.
//! - **Session** ([`session`]): a state machine that maps each operation's
//!   status code to a transition and a status message. The session is a single
//!   immutable value, either `Anonymous` or `Authenticated(user, token)`.
//! - **Refresh handle** ([`store`]): persists the refresh-session cookie so a
//!   fresh process can refresh or log out without resending a password.
//!
//! ## Security
//!
//! Passwords, access tokens and refresh handles are held in `secrecy` types and
//! must never be logged.

pub mod api;
pub mod cli;
pub mod config;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
