//! Schnittstelle zum Peer-Transport
//!
//! Der eigentliche Transport (WebRTC o.ae.) ist eine Black Box. Die Session
//! treibt ihn ueber Offer/Answer/Kandidaten und sendet Text ueber den
//! geoeffneten Kanal. Alles was der Transport von sich aus meldet, kommt als
//! `TransportEvent` ueber einen Kanal zurueck.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Meldungen des Transports an die Session
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Lokaler ICE-Kandidat, muss ueber das Relay an den Peer
    LocalCandidate(Value),
    /// Datenkanal ist offen
    ChannelOpen,
    /// Nachricht vom Peer ueber den Datenkanal
    Message(String),
    /// Transport ist gescheitert
    Failed(String),
    /// Peer hat den Kanal geschlossen
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// Aufruf passt nicht zum Verhandlungsstand
    #[error("Ungueltiger Transport-Zustand: {0}")]
    Zustand(String),

    #[error("Kanal geschlossen")]
    KanalGeschlossen,

    #[error("Transport gescheitert: {0}")]
    Gescheitert(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Peer-Transport, von der Session exklusiv besessen
#[async_trait]
pub trait PeerTransport: Send {
    /// Erzeugt das lokale Offer (Initiator)
    async fn create_offer(&mut self) -> TransportResult<Value>;

    /// Uebernimmt das Remote-Offer und gibt die lokale Answer zurueck (Responder)
    async fn accept_offer(&mut self, offer: &Value) -> TransportResult<Value>;

    /// Uebernimmt die Remote-Answer (Initiator)
    async fn accept_answer(&mut self, answer: &Value) -> TransportResult<()>;

    /// Fuegt einen Remote-Kandidaten hinzu
    async fn add_ice_candidate(&mut self, candidate: &Value) -> TransportResult<()>;

    /// Sendet Text ueber den offenen Kanal
    async fn send(&mut self, text: String) -> TransportResult<()>;

    /// Schliesst den Kanal
    async fn close(&mut self);
}
