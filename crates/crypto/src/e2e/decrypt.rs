//! Chat-Nachrichten Entschluesselung
//!
//! Verifiziert den Auth-Tag bevor Klartext herausgegeben wird. Jede Abweichung
//! (kaputtes Base64, falsche Nonce-Laenge, Tag-Fehler, kein UTF-8) endet in
//! `CryptoError::Entschluesselung`, nie in verfaelschtem Klartext.

use aes_gcm::{aead::Aead, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::e2e::encrypt::IV_LAENGE;
use crate::e2e::key_exchange::SharedKey;
use crate::error::{CryptoError, CryptoResult};
use crate::types::EncryptedPayload;

/// Entschluesselt eine Chat-Nachricht
pub fn decrypt_message(key: &SharedKey, payload: &EncryptedPayload) -> CryptoResult<String> {
    let iv = STANDARD
        .decode(&payload.iv)
        .map_err(|e| CryptoError::Entschluesselung(format!("IV: {e}")))?;
    if iv.len() != IV_LAENGE {
        return Err(CryptoError::Entschluesselung(format!(
            "IV-Laenge: erwartet {IV_LAENGE}, erhalten {}",
            iv.len()
        )));
    }

    let ciphertext = STANDARD
        .decode(&payload.data)
        .map_err(|e| CryptoError::Entschluesselung(format!("Daten: {e}")))?;

    let klartext = key
        .cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| CryptoError::Entschluesselung("Auth-Tag ungueltig".to_string()))?;

    String::from_utf8(klartext)
        .map_err(|_| CryptoError::Entschluesselung("Klartext ist kein UTF-8".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
