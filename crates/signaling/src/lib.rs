//! kammer-signaling - Signaling-Relay fuer private Zwei-Personen-Raeume
//!
//! Dieser Crate gibt Identitaets- und Raum-Tokens aus und leitet
//! Verhandlungsnachrichten zwischen den beiden Teilnehmern eines Raums weiter.
//! Chat-Inhalte sieht das Relay nie.
//!
//! ## Architektur
//!
//! ```text
//! SignalingServer (axum, ein TCP-Listener)
//!     |
//!     +-- /auth/login, /rooms/*   (Token-Ausgabe)
//!     +-- /ws                     (Handshake: Origin, Tokens, Kapazitaet)
//!             |
//!             v
//!         RelayConnection (pro WebSocket ein Task)
//!             |
//!             v
//!         RoomRegistry  - Raum-ID -> Mitglieder (max. 2)
//!         ClientSender  - begrenzte Send-Queue pro Verbindung
//! ```

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod server;
pub mod server_state;

// Bequeme Re-Exporte
pub use connection::RelayConnection;
pub use error::{SignalingError, SignalingResult};
pub use registry::{Mitgliedschaft, RoomRegistry, RAUM_KAPAZITAET};
pub use server::{router, SignalingServer};
pub use server_state::{RelayConfig, RelayState};
