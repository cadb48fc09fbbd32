use std::net::SocketAddr;

use {
    futures::{SinkExt, StreamExt},
    tokio::net::TcpStream,
    tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message},
};

use tienda_config::Config;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Boot a full server on an ephemeral port with an in-memory store.
pub async fn spawn_server() -> SocketAddr {
    let config = Config::from_lookup(|name| match name {
        "DATABASE_URL" => Some("sqlite::memory:".into()),
        "SESSION_SECRET" => Some("test-secret".into()),
        _ => None,
    })
    .expect("test config");
    let state = tienda_gateway::build_state(&config).await.expect("state");
    let app = tienda_gateway::build_app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("serve");
    });
    addr
}

pub async fn connect_ws(addr: SocketAddr) -> WsClient {
    let (stream, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("ws connect");
    stream
}

/// Read the next JSON frame, skipping non-text messages.
pub async fn next_frame(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
            .await
            .expect("frame timeout")
            .expect("stream ended")
            .expect("ws error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("frame json");
        }
    }
}

/// Read frames until one with the given event name arrives.
pub async fn next_event(ws: &mut WsClient, event: &str) -> serde_json::Value {
    loop {
        let frame = next_frame(ws).await;
        if frame["event"] == event {
            return frame;
        }
    }
}

pub async fn send_event(ws: &mut WsClient, event: &str, data: serde_json::Value) {
    let frame = serde_json::json!({ "event": event, "data": data }).to_string();
    ws.send(Message::Text(frame.into())).await.expect("ws send");
}
