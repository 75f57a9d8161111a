//! Fehlertypen fuer den Token-Codec

use thiserror::Error;

/// Alle moeglichen Fehler im Token-Codec
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signatur falsch, Struktur kaputt oder abgelaufen (ohne Angabe welche
    /// Pruefung fehlgeschlagen ist)
    #[error("Token ungueltig")]
    TokenUngueltig,

    #[error("Token-Signierung fehlgeschlagen: {0}")]
    Signierung(String),
}

/// Result-Alias fuer den Token-Codec
pub type AuthResult<T> = Result<T, AuthError>;
