//! Chat-Nachrichten Verschluesselung
//!
//! Verschluesselt UTF-8-Text mit dem gemeinsamen Sitzungsschluessel.
//!
//! ## Nonce
//! Pro Nachricht 12 frische Zufalls-Bytes aus dem OS-Zufallsgenerator. Es gibt
//! keinen Zaehler: die Eindeutigkeit folgt aus der Ziehung selbst.

use aes_gcm::{aead::Aead, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::e2e::key_exchange::SharedKey;
use crate::error::{CryptoError, CryptoResult};
use crate::types::EncryptedPayload;

/// Laenge der AES-GCM-Nonce in Bytes
pub const IV_LAENGE: usize = 12;

/// Verschluesselt einen Chat-Text
///
/// Gibt `{iv, data}` zurueck, beide Felder Base64-kodiert.
pub fn encrypt_message(key: &SharedKey, plaintext: &str) -> CryptoResult<EncryptedPayload> {
    let mut iv = [0u8; IV_LAENGE];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = key
        .cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    Ok(EncryptedPayload {
        iv: STANDARD.encode(iv),
        data: STANDARD.encode(ciphertext),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
