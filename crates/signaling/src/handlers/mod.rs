//! HTTP-Handler des Relays
//!
//! Jeder Handler gibt `SignalingResult` zurueck, Fehler werden ueber
//! `SignalingError::into_response` zu `{error}`-Antworten.

pub mod auth_handler;
pub mod room_handler;
pub mod ws_handler;

use axum::http::{header, HeaderMap};

/// Extrahiert das Bearer-Token aus dem Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Extrahiert das Identitaets-Token aus dem `token`-Cookie
pub fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .find_map(|paar| paar.trim().strip_prefix("token="))
        .filter(|t| !t.is_empty())
}
