//! Server-side sessions with a sliding one-hour TTL, plus signed session
//! cookies. Expired records are dropped on read; `purge_expired` exists for
//! periodic sweeps.

pub mod cookie;
pub mod store;

pub use {
    cookie::{SESSION_COOKIE, sign_cookie, verify_cookie},
    store::{SESSION_TTL_SECS, Session, SessionStore},
};
