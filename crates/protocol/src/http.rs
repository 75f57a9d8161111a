//! Bodies der HTTP-Endpunkte (Identitaet, Raumausgabe) und Handshake-Parameter

use kammer_core::RoomId;
use serde::{Deserialize, Serialize};

/// `POST /auth/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Frei gewaehlter Anzeigename, wird ohne Passwort uebernommen
    #[serde(default)]
    pub username: Option<String>,
}

/// Antwort auf `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    /// Identitaets-Token (zusaetzlich als Cookie gesetzt)
    pub token: String,
}

/// Antwort auf `GET /rooms/new` und `GET /rooms/{roomId}/token`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_id: RoomId,
    /// Raumbindungs-Token fuer den Relay-Handshake
    pub sig_token: String,
}

/// Fehlerantwort der HTTP-Endpunkte
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handshake-Parameter des Relay-WebSockets (`/ws?token=..&sigToken=..`)
///
/// `token` darf fehlen, wenn das Identitaets-Token als Cookie mitkommt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeParams {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub sig_token: Option<String>,
}
