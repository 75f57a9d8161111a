//! Fehlertypen fuer das Signaling-Relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use kammer_auth::AuthError;
use kammer_protocol::ErrorResponse;
use thiserror::Error;

/// Fehlertyp fuer das Signaling-Relay
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Identitaets- oder Raum-Token fehlt oder ist ungueltig
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// `Origin`-Header passt nicht zum erlaubten Ursprung
    #[error("Ursprung nicht erlaubt: {0}")]
    UrsprungVerweigert(String),

    /// Raum hat bereits zwei Teilnehmer
    #[error("Raum ist voll")]
    RaumVoll,

    /// Anfrage ist unvollstaendig oder fehlerhaft
    #[error("Ungueltige Anfrage: {0}")]
    UngueltigeAnfrage(String),

    /// IO-Fehler (Listener, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// JSON-Serialisierung fehlgeschlagen
    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SignalingError {
    /// Erstellt einen internen Fehler
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Erstellt einen Fehler fuer eine ungueltige Anfrage
    pub fn anfrage(msg: impl Into<String>) -> Self {
        Self::UngueltigeAnfrage(msg.into())
    }

    /// HTTP-Statuscode fuer diesen Fehler
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Auth(AuthError::TokenUngueltig) => 401,
            Self::Auth(AuthError::Signierung(_)) => 500,
            Self::UrsprungVerweigert(_) => 403,
            Self::RaumVoll => 409,
            Self::UngueltigeAnfrage(_) => 400,
            Self::Io(_) | Self::Json(_) | Self::Intern(_) => 500,
        }
    }
}

impl IntoResponse for SignalingError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(fehler = %self, "Anfrage fehlgeschlagen");
        } else {
            tracing::debug!(status = status.as_u16(), fehler = %self, "Anfrage abgelehnt");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Result-Typ fuer das Signaling-Relay
pub type SignalingResult<T> = Result<T, SignalingError>;
