use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{ConnectInfo, State, WebSocketUpgrade},
        response::{IntoResponse, Json},
        routing::get,
    },
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{debug, error, info, trace, warn},
};

use {
    tienda_auth::AuthService,
    tienda_config::Config,
    tienda_sessions::SessionStore,
    tienda_store::{Carts, SqliteCatalog, SqliteMessages, Tickets, Users},
};

use crate::{
    routes,
    state::{BridgeState, Gateways},
    ws::handle_connection,
};

/// How often expired sessions are swept out of the store.
const SESSION_PURGE_INTERVAL_SECS: u64 = 600;

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<BridgeState>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the application router (shared between production startup and tests).
pub fn build_app(bridge: Arc<BridgeState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/loggertest", get(logger_test_handler))
        .route("/ws", get(ws_upgrade_handler))
        .merge(routes::views::router())
        .nest("/api/products", routes::products::router())
        .nest("/api/carts", routes::carts::router())
        .nest("/api/tickets", routes::tickets::router())
        .nest("/api/auth", routes::auth::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { bridge })
}

/// Wire the store, gateways, and bridge from configuration. Any failure here
/// aborts startup; there is no partial or degraded mode.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<BridgeState>> {
    let pool = tienda_store::connect(&config.database_url).await?;
    let sessions = SessionStore::init(pool.clone()).await?;
    let gateways = Gateways {
        catalog: Arc::new(SqliteCatalog::new(pool.clone())),
        messages: Arc::new(SqliteMessages::new(pool.clone())),
        carts: Carts::new(pool.clone()),
        tickets: Tickets::new(pool.clone()),
        sessions: sessions.clone(),
        auth: AuthService::new(Users::new(pool), sessions),
    };
    Ok(BridgeState::new(gateways, config.session_secret.clone()))
}

/// Start the HTTP + realtime server and run until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = build_app(Arc::clone(&state));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(version = %state.version, %addr, "tienda listening");

    // Periodic sweep of expired sessions; reads already drop them lazily.
    let purge_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            SESSION_PURGE_INTERVAL_SECS,
        ));
        loop {
            interval.tick().await;
            match purge_state.gateways.sessions.purge_expired().await {
                Ok(0) => {},
                Ok(n) => debug!(purged = n, "expired sessions swept"),
                Err(e) => warn!(error = %e, "session sweep failed"),
            }
        }
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let connections = state.bridge.client_count().await;
    Json(serde_json::json!({
        "status": "ok",
        "version": state.bridge.version,
        "connections": connections,
    }))
}

/// Operational smoke test for the logging pipeline: one line per severity.
async fn logger_test_handler() -> impl IntoResponse {
    trace!("logger test: trace");
    debug!("logger test: debug");
    info!("logger test: info");
    warn!("logger test: warn");
    error!("logger test: error");
    error!(fatal = true, "logger test: fatal");
    "Logger test complete"
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.bridge, addr))
}
