use tracing::{debug, warn};

use tienda_protocol::ServerEvent;

use crate::state::BridgeState;

/// Fan an event out to every registered client, serializing once.
///
/// `except` skips one connection (used for `nuevo_user`, which goes to every
/// *other* participant). Clients whose write loop has already gone away are
/// skipped; their registry entry is cleaned up on disconnect.
pub async fn broadcast(state: &BridgeState, event: &ServerEvent, except: Option<&str>) {
    let frame = match event.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "dropping unserializable broadcast");
            return;
        },
    };
    let clients = state.clients.read().await;
    for (conn_id, client) in clients.iter() {
        if Some(conn_id.as_str()) == except {
            continue;
        }
        if !client.send(&frame) {
            debug!(conn_id, "send to closing connection skipped");
        }
    }
}
