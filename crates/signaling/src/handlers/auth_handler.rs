//! Identitaets-Ausgabe - `POST /auth/login`
//!
//! Keine Passwortpruefung: der Name wird als Identitaet uebernommen und
//! signiert. Das Token geht in den Body und als HttpOnly-Cookie zurueck.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use kammer_auth::{token_ttl, IdentityClaim};
use kammer_protocol::{LoginRequest, LoginResponse};

use crate::error::{SignalingError, SignalingResult};
use crate::server_state::RelayState;

/// `POST /auth/login {username}`
pub async fn login(State(state): State<RelayState>, body: Bytes) -> SignalingResult<Response> {
    let anfrage: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();
    let username = anfrage
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SignalingError::anfrage("username fehlt"))?;

    let token = state
        .codec
        .signieren(IdentityClaim::neu(username), token_ttl())?;

    tracing::info!(subject = %username, "Identitaet ausgegeben");

    let cookie = format!("token={token}; HttpOnly; SameSite=Lax; Path=/");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { ok: true, token }),
    )
        .into_response())
}
