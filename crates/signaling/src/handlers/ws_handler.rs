//! Relay-Handshake - `GET /ws?token=..&sigToken=..`
//!
//! Ursprung, beide Tokens und die Raumkapazitaet werden geprueft, bevor der
//! WebSocket-Upgrade stattfindet. Ein abgelehnter Client bekommt nie einen
//! Socket und taucht in keiner Raumgruppe auf.

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::{header, HeaderMap},
    response::Response,
};
use kammer_auth::{AuthError, IdentityClaim, RoomBindingClaim};
use kammer_protocol::HandshakeParams;

use crate::connection::RelayConnection;
use crate::error::{SignalingError, SignalingResult};
use crate::handlers::cookie_token;
use crate::server_state::RelayState;

/// Prueft den `Origin`-Header gegen den erlaubten Ursprung
///
/// Fehlt der Header (kein Browser), wird nicht geprueft.
pub fn ursprung_pruefen(headers: &HeaderMap, erlaubt: &str) -> SignalingResult<()> {
    match headers.get(header::ORIGIN) {
        None => Ok(()),
        Some(wert) => {
            let ursprung = wert.to_str().unwrap_or_default();
            if ursprung == erlaubt {
                Ok(())
            } else {
                Err(SignalingError::UrsprungVerweigert(ursprung.to_string()))
            }
        }
    }
}

/// `GET /ws` - authentifiziert, tritt dem Raum bei und startet die Verbindung
pub async fn relay_verbinden(
    State(state): State<RelayState>,
    Query(params): Query<HandshakeParams>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> SignalingResult<Response> {
    ursprung_pruefen(&headers, &state.config.erlaubter_ursprung)?;

    let token = params
        .token
        .as_deref()
        .or_else(|| cookie_token(&headers))
        .ok_or(AuthError::TokenUngueltig)?;
    let sig_token = params.sig_token.as_deref().ok_or(AuthError::TokenUngueltig)?;

    let identitaet: IdentityClaim = state.codec.pruefen(token)?;
    let bindung: RoomBindingClaim = state.codec.pruefen(sig_token)?;

    let ws = ws.ok_or_else(|| SignalingError::anfrage("WebSocket-Upgrade erwartet"))?;

    let (mitgliedschaft, ausgehend) = state.registry.beitreten(bindung.room_id, identitaet.sub)?;
    let shutdown_rx = state.shutdown_rx.clone();

    Ok(ws.on_upgrade(move |socket| {
        RelayConnection::neu(mitgliedschaft).verarbeiten(socket, ausgehend, shutdown_rx)
    }))
}
