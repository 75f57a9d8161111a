//! # kammer-peer
//!
//! Client-Seite von Kammer: verbindet sich mit dem Relay, handelt den
//! Peer-Transport aus, vereinbart den Sitzungsschluessel und tauscht
//! verschluesselte Nachrichten direkt mit dem Peer aus.
//!
//! ## Module
//! - `session` - Zustandsmaschine der Peer-Session
//! - `client` - WebSocket-Verbindung zum Relay
//! - `transport` - Schnittstelle zum Peer-Transport
//! - `loopback` - In-Memory-Transport (Tests, Demos)
//! - `state` - Zustaende und Rollen
//! - `error` - Fehlertypen

pub mod client;
pub mod error;
pub mod loopback;
pub mod session;
pub mod state;
pub mod transport;

pub use client::SignalingClient;
pub use error::{SessionError, SessionResult};
pub use loopback::LoopbackTransport;
pub use session::{PeerSession, SessionEvent};
pub use state::{Role, SessionState};
pub use transport::{PeerTransport, TransportError, TransportEvent, TransportResult};
