//! kammer-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Nachrichtentypen die zwischen Client und
//! Relay ausgetauscht werden, sowie die Bodies der HTTP-Ausgabe-Endpunkte.

pub mod http;
pub mod signal;

pub use http::{ErrorResponse, HandshakeParams, LoginRequest, LoginResponse, RoomResponse};
pub use signal::{RelayMessage, SignalEnvelope, SignalKind, SystemEvent};
