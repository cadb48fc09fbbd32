//! Shared wire types: domain models, realtime event frames, and the HTTP
//! response envelope.
//!
//! The realtime channel speaks JSON frames of the shape
//! `{"event": "<name>", "data": <payload>}`. Event names are part of the
//! public contract and keep their historical spelling (`productos`,
//! `agregarProducto`, `nuevo_user`, ...).

pub mod envelope;
pub mod events;
pub mod models;

pub use {
    envelope::Envelope,
    events::{ClientEvent, ErrorAck, ServerEvent, error_codes},
    models::{ChatDraft, ChatMessage, Page, Product, ProductDraft, ProductPatch},
};
