//! Fehlertypen fuer die Peer-Session

use kammer_crypto::CryptoError;
use thiserror::Error;

use crate::state::SessionState;
use crate::transport::TransportError;

/// Alle moeglichen Fehler der Peer-Session
///
/// Fatal (Session endet in `Failed`): Schluessel-Import, abweichender
/// Peer-Schluessel, Transportfehler. Alle anderen Fehler lassen den
/// Zustand unveraendert.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Krypto-Fehler: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Transport-Fehler: {0}")]
    Transport(#[from] TransportError),

    /// Gemeinsamer Schluessel existiert noch nicht
    #[error("Schluessel noch nicht bereit")]
    SchluesselNichtBereit,

    /// Offer beim Initiator oder zweites Offer
    #[error("Glare: unerwartetes Offer")]
    Glare,

    #[error("Aktion im Zustand {0:?} nicht moeglich")]
    UngueltigerZustand(SessionState),

    #[error("Peer-Kanal ist nicht offen")]
    KanalNichtOffen,

    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    /// Relay hat den Handshake mit diesem HTTP-Status abgelehnt
    #[error("Relay hat abgelehnt (HTTP {0})")]
    RelayAbgelehnt(u16),

    #[error("Relay-Verbindung: {0}")]
    Verbindung(String),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    pub fn protokoll(msg: impl Into<String>) -> Self {
        Self::Protokoll(msg.into())
    }
}

/// Result-Alias fuer die Peer-Session
pub type SessionResult<T> = Result<T, SessionError>;
