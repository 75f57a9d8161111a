//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Oeffentlicher Schluessel des Peers ist kein gueltiger P-256-Punkt
    /// (oder kein gueltiges Base64). Fuer die Session fatal.
    #[error("Import des Peer-Schluessels fehlgeschlagen: {0}")]
    KeyImport(String),

    #[error("Schluessel-Ableitung fehlgeschlagen: {0}")]
    KeyDerivation(String),

    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    /// Auth-Tag passt nicht (manipuliert oder falscher Schluessel) oder der
    /// Payload ist strukturell kaputt. Nur diese eine Nachricht ist verloren.
    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
