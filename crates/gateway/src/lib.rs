//! HTTP router and realtime bridge for the tienda backend.
//!
//! The bridge is the focal component: it replays the catalog snapshot and
//! chat history to each new connection, relays add-product writes with a
//! same-connection echo, and rebroadcasts the full chat log to everyone on
//! each new message.

pub mod broadcast;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod ws;

pub use server::{AppState, build_app, build_state, serve};
