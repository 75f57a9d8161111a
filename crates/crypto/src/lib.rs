//! # kammer-crypto
//!
//! Ende-zu-Ende Verschluesselung zwischen den beiden Peers eines Raums.
//! Das Relay sieht nur oeffentliche Schluessel, niemals Chat-Inhalt.
//!
//! ## Module
//! - `e2e` - Schluesselvereinbarung und Nachrichten-Codec
//! - `types` - Gemeinsame Typen (EncryptedPayload)
//! - `error` - Fehlertypen

pub mod e2e;
pub mod error;
pub mod types;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use types::EncryptedPayload;

pub use e2e::{
    decrypt_message, derive_shared_key, encrypt_message, generate_key_pair, SessionKeyPair,
    SharedKey,
};
