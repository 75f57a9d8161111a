//! kammer-core – Gemeinsame Typen
//!
//! Newtypes die von Relay, Token-Codec und Client gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{ConnectionId, RoomId, RoomIdFehler};
