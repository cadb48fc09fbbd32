use std::{collections::HashMap, sync::Arc, time::Instant};

use tokio::sync::{RwLock, mpsc};

use {
    tienda_auth::AuthService,
    tienda_sessions::SessionStore,
    tienda_store::{Carts, CatalogStore, MessageStore, Tickets},
};

// ── Connected client ─────────────────────────────────────────────────────────

/// A realtime client currently connected to the bridge.
#[derive(Debug)]
pub struct ConnectedClient {
    pub conn_id: String,
    /// Channel feeding this client's write loop with serialized frames.
    pub sender: mpsc::UnboundedSender<String>,
    pub connected_at: Instant,
}

impl ConnectedClient {
    /// Queue a serialized JSON frame for this client. Returns false when the
    /// write loop is gone (connection closing).
    pub fn send(&self, frame: &str) -> bool {
        self.sender.send(frame.to_string()).is_ok()
    }
}

// ── Gateways ─────────────────────────────────────────────────────────────────

/// The store façades shared by the HTTP layer and the realtime bridge.
#[derive(Clone)]
pub struct Gateways {
    pub catalog: Arc<dyn CatalogStore>,
    pub messages: Arc<dyn MessageStore>,
    pub carts: Carts,
    pub tickets: Tickets,
    pub sessions: SessionStore,
    pub auth: AuthService,
}

// ── Bridge state ─────────────────────────────────────────────────────────────

/// Shared runtime state, wrapped in `Arc` for use across async tasks.
pub struct BridgeState {
    /// All connected realtime clients, keyed by conn_id. Only *initialized*
    /// connections are registered; a connection still replaying its initial
    /// snapshot is not yet a broadcast target.
    pub clients: RwLock<HashMap<String, ConnectedClient>>,
    pub gateways: Gateways,
    /// Secret for session-cookie signing.
    pub session_secret: String,
    pub version: String,
}

impl BridgeState {
    pub fn new(gateways: Gateways, session_secret: String) -> Arc<Self> {
        Arc::new(Self {
            clients: RwLock::new(HashMap::new()),
            gateways,
            session_secret,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    pub async fn register_client(&self, client: ConnectedClient) {
        let conn_id = client.conn_id.clone();
        self.clients.write().await.insert(conn_id, client);
    }

    /// Remove a client by conn_id. All per-connection state dies with it.
    pub async fn remove_client(&self, conn_id: &str) -> Option<ConnectedClient> {
        self.clients.write().await.remove(conn_id)
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}
