//! The realtime bridge: one task per connection, bridging a WebSocket to the
//! catalog and message gateways.
//!
//! Lifecycle: *connected* (socket open, not yet a broadcast target) →
//! *initialized* (after the private catalog + history replay) → *closed*
//! (registry entry and local snapshot discarded). There is no resume; a
//! reconnecting client starts over with a fresh replay.

use std::{net::SocketAddr, sync::Arc, time::Instant};

use {
    axum::extract::ws::{Message, WebSocket},
    futures::{SinkExt, StreamExt},
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use tienda_protocol::{
    ChatDraft, ClientEvent, ErrorAck, Product, ProductDraft, ServerEvent, error_codes,
};

use crate::{
    broadcast::broadcast,
    error::store_error_code,
    state::{BridgeState, ConnectedClient},
};

/// Drive one realtime connection to completion.
pub async fn handle_connection(socket: WebSocket, state: Arc<BridgeState>, addr: SocketAddr) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Write loop: drains the per-connection queue into the socket.
    let write_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Replay runs before the client becomes a broadcast target, so the full
    // snapshot and history always precede any incremental event.
    let mut snapshot = match replay(&state, &tx).await {
        Ok(products) => products,
        Err(ack) => {
            send_event(&tx, &ServerEvent::Error(ack));
            Vec::new()
        },
    };

    state
        .register_client(ConnectedClient {
            conn_id: conn_id.clone(),
            sender: tx.clone(),
            connected_at: Instant::now(),
        })
        .await;
    info!(conn_id, %addr, "realtime client initialized");

    broadcast(&state, &ServerEvent::NewUser, Some(&conn_id)).await;

    // Read loop: inbound events on one connection are handled strictly in
    // arrival order.
    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                dispatch(&state, &tx, &mut snapshot, text.as_str()).await;
            },
            Message::Close(_) => break,
            // Axum answers pings itself; binary frames are not part of the
            // contract.
            _ => {},
        }
    }

    state.remove_client(&conn_id).await;
    write_task.abort();
    info!(conn_id, "realtime client closed");
}

/// Send the private replay: full catalog snapshot, then full chat history.
/// Returns the connection-local product snapshot.
async fn replay(
    state: &BridgeState,
    tx: &mpsc::UnboundedSender<String>,
) -> Result<Vec<Product>, ErrorAck> {
    let products = state
        .gateways
        .catalog
        .list_all()
        .await
        .map_err(|e| ErrorAck::new(store_error_code(&e).1, e.to_string()))?;
    send_event(tx, &ServerEvent::snapshot(&products));

    let history = state
        .gateways
        .messages
        .list_all()
        .await
        .map_err(|e| ErrorAck::new(store_error_code(&e).1, e.to_string()))?;
    send_event(tx, &ServerEvent::History(history));

    Ok(products)
}

/// Parse and apply one inbound frame.
async fn dispatch(
    state: &BridgeState,
    tx: &mpsc::UnboundedSender<String>,
    snapshot: &mut Vec<Product>,
    text: &str,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "unparseable realtime frame");
            send_event(
                tx,
                &ServerEvent::Error(ErrorAck::new(
                    error_codes::BAD_REQUEST,
                    format!("unrecognized frame: {e}"),
                )),
            );
            return;
        },
    };
    match event {
        ClientEvent::AddProduct(raw) => add_product(state, tx, snapshot, raw).await,
        ClientEvent::Chat(draft) => chat_message(state, tx, draft).await,
    }
}

/// `agregarProducto`: write through the catalog, append the persisted record
/// to the connection-local snapshot, and echo the *raw input payload* back to
/// this connection only. The echo intentionally lacks the generated id and
/// defaults; only the initial snapshot carries persisted records.
async fn add_product(
    state: &BridgeState,
    tx: &mpsc::UnboundedSender<String>,
    snapshot: &mut Vec<Product>,
    raw: serde_json::Value,
) {
    let draft: ProductDraft = match serde_json::from_value(raw.clone()) {
        Ok(draft) => draft,
        Err(e) => {
            send_event(
                tx,
                &ServerEvent::Error(
                    ErrorAck::new(error_codes::VALIDATION, e.to_string())
                        .for_event("agregarProducto"),
                ),
            );
            return;
        },
    };
    match state.gateways.catalog.create(draft).await {
        Ok(product) => {
            debug!(product_id = %product.id, "product added over realtime channel");
            snapshot.push(product);
            send_event(tx, &ServerEvent::Products(raw));
        },
        Err(e) => {
            warn!(error = %e, "realtime add-product rejected");
            send_event(
                tx,
                &ServerEvent::Error(
                    ErrorAck::new(store_error_code(&e).1, e.to_string())
                        .for_event("agregarProducto"),
                ),
            );
        },
    }
}

/// `message`: append through the message gateway, then rebroadcast the whole
/// history to every connection (full-log rebroadcast — every client's view
/// converges on the store order at the cost of O(n) payloads).
async fn chat_message(
    state: &BridgeState,
    tx: &mpsc::UnboundedSender<String>,
    draft: ChatDraft,
) {
    if let Err(e) = state
        .gateways
        .messages
        .append(&draft.sender, &draft.body)
        .await
    {
        warn!(error = %e, "realtime chat message rejected");
        send_event(
            tx,
            &ServerEvent::Error(
                ErrorAck::new(store_error_code(&e).1, e.to_string()).for_event("message"),
            ),
        );
        return;
    }
    match state.gateways.messages.list_all().await {
        Ok(history) => broadcast(state, &ServerEvent::MessageLogs(history), None).await,
        Err(e) => {
            send_event(
                tx,
                &ServerEvent::Error(
                    ErrorAck::new(store_error_code(&e).1, e.to_string()).for_event("message"),
                ),
            );
        },
    }
}

fn send_event(tx: &mpsc::UnboundedSender<String>, event: &ServerEvent) {
    match event.to_frame() {
        Ok(frame) => {
            // A closed write loop just means the connection is going away.
            let _ = tx.send(frame);
        },
        Err(e) => warn!(error = %e, "dropping unserializable frame"),
    }
}
