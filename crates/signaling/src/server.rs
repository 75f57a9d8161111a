//! HTTP/WebSocket-Server des Relays
//!
//! Bindet einen TCP-Listener und bedient darauf alle Routen:
//!
//! ```text
//! GET  /health
//! POST /auth/login
//! GET  /rooms/new
//! GET  /rooms/:room_id/token
//! GET  /ws?token=..&sigToken=..   (WebSocket-Upgrade)
//! ```

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{SignalingError, SignalingResult};
use crate::handlers::{auth_handler, room_handler, ws_handler};
use crate::server_state::RelayState;

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Erstellt den vollstaendigen Router mit CORS und Request-Tracing
///
/// CORS erlaubt genau den konfigurierten Ursprung, mit Credentials.
pub fn router(state: RelayState) -> SignalingResult<Router> {
    let ursprung: HeaderValue = state
        .config
        .erlaubter_ursprung
        .parse()
        .map_err(|_| SignalingError::intern("erlaubter Ursprung ist kein gueltiger Header-Wert"))?;

    let cors = CorsLayer::new()
        .allow_origin(ursprung)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth_handler::login))
        .route("/rooms/new", get(room_handler::raum_neu))
        .route("/rooms/:room_id/token", get(room_handler::raum_token))
        .route("/ws", get(ws_handler::relay_verbinden))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Wartet bis das Shutdown-Signal `true` wird oder der Sender wegfaellt
async fn shutdown_abwarten(mut shutdown_rx: watch::Receiver<bool>) {
    while !*shutdown_rx.borrow() {
        if shutdown_rx.changed().await.is_err() {
            break;
        }
    }
}

/// Signaling-Relay-Server
pub struct SignalingServer {
    state: RelayState,
    listener: TcpListener,
}

impl SignalingServer {
    /// Bindet den TCP-Listener (Port 0 waehlt einen freien Port)
    pub async fn binden(state: RelayState, bind_addr: SocketAddr) -> SignalingResult<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        Ok(Self { state, listener })
    }

    /// Tatsaechlich gebundene Adresse
    pub fn lokale_adresse(&self) -> SignalingResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Bedient Verbindungen bis das Shutdown-Signal eintrifft
    pub async fn starten(self) -> SignalingResult<()> {
        let adresse = self.lokale_adresse()?;
        let app = router(self.state.clone())?;
        let shutdown_rx = self.state.shutdown_rx.clone();

        tracing::info!(
            adresse = %adresse,
            ursprung = %self.state.config.erlaubter_ursprung,
            "Signaling-Relay gestartet"
        );

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_abwarten(shutdown_rx))
            .await?;

        tracing::info!("Signaling-Relay gestoppt");
        Ok(())
    }
}
