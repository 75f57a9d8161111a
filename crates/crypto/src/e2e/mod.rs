//! E2E Verschluesselung (Peer <-> Peer)
//!
//! Das Relay forwardet nur Verhandlungsnachrichten und kann den Chat-Inhalt
//! nicht entschluesseln.
//!
//! ## Ablauf
//! 1. Jeder Client erzeugt pro Raum ein frisches ECDH-P-256-Schluesselpaar
//! 2. Der oeffentliche Schluessel geht als `pubkey`-Nachricht ueber das Relay
//! 3. Beide Seiten leiten unabhaengig denselben AES-256-GCM-Schluessel ab
//! 4. Chat-Text wird mit frischer Zufalls-Nonce verschluesselt und direkt
//!    ueber den Peer-Kanal gesendet

pub mod decrypt;
pub mod encrypt;
pub mod key_exchange;

pub use decrypt::decrypt_message;
pub use encrypt::encrypt_message;
pub use key_exchange::{derive_shared_key, generate_key_pair, SessionKeyPair, SharedKey};
