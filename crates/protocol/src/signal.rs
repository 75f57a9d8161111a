//! Signaling-Vokabular (WebSocket-Textframes, JSON)
//!
//! Vier Nachrichtentypen werden zwischen den beiden Teilnehmern eines Raums
//! weitergeleitet, zwei Systemereignisse erzeugt das Relay selbst.
//!
//! ## Design
//! - Tagged Enums (`type`-Feld) fuer typsichere Nachrichtentypen
//! - SDP- und Kandidaten-Payloads bleiben opakes JSON (`serde_json::Value`),
//!   das Relay und der Client reichen sie nur an den Transport durch
//! - Das Relay liest ausschliesslich den Diskriminator (`SignalKind::aus_text`)

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Weitergeleitete Nachrichten
// ---------------------------------------------------------------------------

/// Verhandlungsnachricht zwischen zwei Peers
///
/// Enthaelt niemals Chat-Inhalt, nur Verbindungs-Metadaten und den
/// oeffentlichen Schluessel fuer die Schluesselvereinbarung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalEnvelope {
    /// Roher EC-Public-Key (SEC1, unkomprimiert), Base64
    Pubkey { pubkey: String },
    /// SDP-Offer des Initiators
    Offer { sdp: Value },
    /// SDP-Answer des Responders
    Answer { sdp: Value },
    /// ICE-Kandidat
    Candidate { candidate: Value },
}

impl SignalEnvelope {
    /// Gibt den Diskriminator der Nachricht zurueck
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Pubkey { .. } => SignalKind::Pubkey,
            Self::Offer { .. } => SignalKind::Offer,
            Self::Answer { .. } => SignalKind::Answer,
            Self::Candidate { .. } => SignalKind::Candidate,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Diskriminator der weiterleitbaren Nachrichten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
    Pubkey,
}

impl SignalKind {
    /// Liest den Diskriminator aus einem rohen Textframe
    ///
    /// Gibt `None` zurueck bei ungueltigem JSON, bei allem ausser einem
    /// Objekt sowie bei fehlendem oder unbekanntem `type`. Der restliche
    /// Inhalt wird nicht validiert.
    pub fn aus_text(text: &str) -> Option<Self> {
        let objekt: serde_json::Map<String, Value> = serde_json::from_str(text).ok()?;
        match objekt.get("type")?.as_str()? {
            "offer" => Some(Self::Offer),
            "answer" => Some(Self::Answer),
            "candidate" => Some(Self::Candidate),
            "pubkey" => Some(Self::Pubkey),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Systemereignisse
// ---------------------------------------------------------------------------

/// Mitgliedschaftsereignis, vom Relay erzeugt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SystemEvent {
    Join { user: String },
    Leave { user: String },
}

impl SystemEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Eingehend beim Client
// ---------------------------------------------------------------------------

/// Alles was ein Client vom Relay empfangen kann
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayMessage {
    Signal(SignalEnvelope),
    System(SystemEvent),
}

impl RelayMessage {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
