//! ECDH-P-256 Schluesselvereinbarung
//!
//! Ablauf pro Raum-Session:
//! 1. `generate_key_pair` - frisches ephemeres Schluesselpaar
//! 2. Oeffentlichen Schluessel roh (SEC1 unkomprimiert, 65 Bytes) als Base64
//!    an den Peer senden
//! 3. `derive_shared_key` - ECDH mit dem Peer-Schluessel, die x-Koordinate
//!    des gemeinsamen Punkts (32 Bytes) wird direkt der AES-256-GCM-Schluessel
//!
//! Schritt 3 entspricht der Web-Crypto-Ableitung `ECDH -> AES-GCM 256`, damit
//! Browser-Peers denselben Schluessel erhalten.

use aes_gcm::{aead::KeyInit, Aes256Gcm};
use base64::{engine::general_purpose::STANDARD, Engine};
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::rngs::OsRng;

use crate::error::{CryptoError, CryptoResult};

/// Lokales Schluesselpaar einer Raum-Session
///
/// Der private Teil verlaesst diese Struktur nie und wird beim Drop genullt.
pub struct SessionKeyPair {
    secret: EphemeralSecret,
    public_key_b64: String,
}

impl SessionKeyPair {
    /// Erzeugt ein frisches Schluesselpaar aus dem OS-Zufallsgenerator
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public_key = secret.public_key().to_encoded_point(false);
        Self {
            public_key_b64: STANDARD.encode(public_key.as_bytes()),
            secret,
        }
    }

    /// Oeffentlicher Schluessel, roh und Base64-kodiert (fuer `pubkey`)
    pub fn public_key_b64(&self) -> &str {
        &self.public_key_b64
    }
}

impl std::fmt::Debug for SessionKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeyPair")
            .field("public_key_b64", &self.public_key_b64)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Abgeleiteter symmetrischer Sitzungsschluessel (AES-256-GCM)
///
/// Nicht exportierbar: es gibt keinen Zugriff auf das Schluesselmaterial,
/// nur Ver- und Entschluesselung innerhalb dieses Crates.
#[derive(Clone)]
pub struct SharedKey {
    pub(crate) cipher: Aes256Gcm,
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey([REDACTED])")
    }
}

/// Erzeugt ein neues Schluesselpaar fuer eine Raum-Session
pub fn generate_key_pair() -> SessionKeyPair {
    SessionKeyPair::generate()
}

/// Leitet den gemeinsamen Schluessel aus eigenem Paar und Peer-Schluessel ab
///
/// Deterministisch: beide Peers erhalten bitgleiche Schluessel, obwohl der
/// Schluessel selbst nie uebertragen wird.
///
/// Gibt `CryptoError::KeyImport` zurueck wenn der Peer-Schluessel kein
/// gueltiges Base64 oder kein Punkt auf P-256 ist.
pub fn derive_shared_key(
    key_pair: &SessionKeyPair,
    peer_public_key_b64: &str,
) -> CryptoResult<SharedKey> {
    let roh = STANDARD
        .decode(peer_public_key_b64.trim())
        .map_err(|e| CryptoError::KeyImport(format!("Base64: {e}")))?;

    let peer_public = PublicKey::from_sec1_bytes(&roh)
        .map_err(|_| CryptoError::KeyImport(format!("kein P-256-Punkt ({} Bytes)", roh.len())))?;

    let geteilt = key_pair.secret.diffie_hellman(&peer_public);
    let cipher = Aes256Gcm::new_from_slice(geteilt.raw_secret_bytes().as_slice())
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    tracing::trace!("Gemeinsamer Schluessel abgeleitet");
    Ok(SharedKey { cipher })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
