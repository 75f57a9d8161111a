//! Raum-Ausgabe - `GET /rooms/new` und `GET /rooms/:room_id/token`

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use kammer_auth::{token_ttl, AuthError, IdentityClaim, RoomBindingClaim};
use kammer_core::RoomId;
use kammer_protocol::RoomResponse;

use crate::error::{SignalingError, SignalingResult};
use crate::handlers::{bearer_token, cookie_token};
use crate::server_state::RelayState;

/// Signiert ein Raumbindungs-Token fuer die gegebene Raum-ID
fn raum_antwort(state: &RelayState, room_id: RoomId) -> SignalingResult<RoomResponse> {
    let sig_token = state
        .codec
        .signieren(RoomBindingClaim::neu(room_id.clone()), token_ttl())?;
    Ok(RoomResponse { room_id, sig_token })
}

/// `GET /rooms/new` - neuer Raum mit frischer Raum-ID
pub async fn raum_neu(State(state): State<RelayState>) -> SignalingResult<Json<RoomResponse>> {
    let antwort = raum_antwort(&state, RoomId::generieren())?;
    tracing::info!(raum = %antwort.room_id, "Raum ausgegeben");
    Ok(Json(antwort))
}

/// `GET /rooms/:room_id/token` - Raum-Token fuer einen bestehenden Raum
///
/// Erfordert ein gueltiges Identitaets-Token (Cookie oder Bearer).
pub async fn raum_token(
    State(state): State<RelayState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> SignalingResult<Json<RoomResponse>> {
    let token = cookie_token(&headers)
        .or_else(|| bearer_token(&headers))
        .ok_or(AuthError::TokenUngueltig)?;
    let identitaet: IdentityClaim = state.codec.pruefen(token)?;

    let room_id = RoomId::parse(&room_id).map_err(|e| SignalingError::anfrage(e.to_string()))?;
    let antwort = raum_antwort(&state, room_id)?;

    tracing::info!(raum = %antwort.room_id, subject = %identitaet.sub, "Raum-Token ausgegeben");
    Ok(Json(antwort))
}
