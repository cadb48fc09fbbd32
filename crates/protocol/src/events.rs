use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::models::{ChatDraft, ChatMessage, Product};

// ── Error codes ──────────────────────────────────────────────────────────────

/// Stable codes carried by realtime `error` acks and HTTP error bodies.
pub mod error_codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION: &str = "validation_error";
    pub const NOT_FOUND: &str = "not_found";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const STORE: &str = "store_error";
}

/// Payload of a realtime `error` ack, sent to the originating connection
/// when an inbound event cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAck {
    pub code: String,
    pub message: String,
    /// Event name the ack responds to, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl ErrorAck {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            event: None,
        }
    }

    pub fn for_event(mut self, event: &str) -> Self {
        self.event = Some(event.into());
        self
    }
}

// ── Client → server ──────────────────────────────────────────────────────────

/// Inbound realtime commands, tagged by the `event` field.
///
/// `agregarProducto` carries its payload as raw JSON: the bridge echoes the
/// payload back verbatim on success, so it must survive untouched even when
/// the parsed draft applies defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "agregarProducto")]
    AddProduct(Value),
    #[serde(rename = "message")]
    Chat(ChatDraft),
}

// ── Server → client ──────────────────────────────────────────────────────────

/// Outbound realtime events, tagged by the `event` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full catalog snapshot on connect, or the raw add-product echo.
    #[serde(rename = "productos")]
    Products(Value),
    /// Full chat history, sent privately to a newly initialized connection.
    #[serde(rename = "message")]
    History(Vec<ChatMessage>),
    /// Full chat history, broadcast to every connection on a new message.
    #[serde(rename = "messageLogs")]
    MessageLogs(Vec<ChatMessage>),
    /// A new participant joined; broadcast to every *other* connection.
    #[serde(rename = "nuevo_user")]
    NewUser,
    /// Explicit failure ack for a rejected inbound event.
    #[serde(rename = "error")]
    Error(ErrorAck),
}

impl ServerEvent {
    /// Snapshot frame for a list of persisted products.
    pub fn snapshot(products: &[Product]) -> Self {
        Self::Products(serde_json::json!(products))
    }

    /// Serialize to the wire frame. Serialization of these types cannot
    /// fail, but the signature stays honest.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
