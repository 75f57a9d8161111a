//! Zustaende und Rollen der Peer-Session
//!
//! ```text
//! Idle -> AwaitingPublicKey -> Negotiating -> Connected -> Closed
//!                 |                 |             |
//!                 +-----------------+-------------+--> Failed
//! ```

use std::cmp::Ordering;

/// Zustand der Peer-Session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Noch nicht gestartet
    Idle,
    /// Eigener Schluessel gesendet, Peer-Schluessel fehlt
    AwaitingPublicKey,
    /// Gemeinsamer Schluessel steht, Kanal noch nicht offen
    Negotiating,
    /// Kanal offen und Schluessel bereit
    Connected,
    /// Regulaer beendet (terminal)
    Closed,
    /// Fatal gescheitert (terminal)
    Failed,
}

impl SessionState {
    pub fn ist_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

/// Rolle in der Offer/Answer-Verhandlung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Erzeugt das Offer
    Initiator,
    /// Antwortet mit der Answer
    Responder,
}

impl Role {
    /// Deterministische Rollenvergabe: der lexikografisch kleinere Name
    /// initiiert. Gleiche Namen ergeben keine Rolle.
    pub fn aus_subjects(eigen: &str, peer: &str) -> Option<Self> {
        match eigen.cmp(peer) {
            Ordering::Less => Some(Self::Initiator),
            Ordering::Greater => Some(Self::Responder),
            Ordering::Equal => None,
        }
    }
}
