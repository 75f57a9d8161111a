//! Raum-Registry - Wer ist in welchem Raum?
//!
//! Die Registry ist die einzige Stelle, an der Raumgruppen entstehen und
//! verschwinden. Eine Gruppe existiert genau so lange, wie mindestens eine
//! Verbindung Mitglied ist, und nimmt hoechstens `RAUM_KAPAZITAET` Mitglieder
//! auf.
//!
//! ## Mitgliedschaft
//! `beitreten` gibt eine `Mitgliedschaft` zurueck. Solange sie lebt, ist die
//! Verbindung im Raum. Beim Drop wird die Verbindung entfernt, ein `leave`
//! an die uebrigen Mitglieder verteilt und eine leere Gruppe verworfen.
//! Es gibt keinen anderen Weg, Mitglieder zu entfernen.

use dashmap::DashMap;
use kammer_core::{ConnectionId, RoomId};
use kammer_protocol::SystemEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::broadcast::ClientSender;
use crate::error::{SignalingError, SignalingResult};

/// Maximale Teilnehmerzahl pro Raum
pub const RAUM_KAPAZITAET: usize = 2;

// ---------------------------------------------------------------------------
// Raumgruppe
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Mitglied {
    subject: String,
    sender: ClientSender,
}

#[derive(Debug, Default)]
struct RoomGroup {
    mitglieder: Vec<Mitglied>,
}

impl RoomGroup {
    /// Sendet einen Frame an alle Mitglieder ausser einer Verbindung
    fn an_andere_senden(&self, ausgeschlossen: &ConnectionId, frame: &str) -> usize {
        self.mitglieder
            .iter()
            .filter(|m| &m.sender.verbindung != ausgeschlossen)
            .filter(|m| m.sender.senden(frame.to_owned()))
            .count()
    }
}

// ---------------------------------------------------------------------------
// RoomRegistry
// ---------------------------------------------------------------------------

/// Zentrale Raum-Registry
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    inner: Arc<DashMap<RoomId, RoomGroup>>,
}

impl RoomRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Nimmt eine Verbindung in einen Raum auf
    ///
    /// Die bisherigen Mitglieder erhalten ein `join` mit `subject`, der
    /// Neuankoemmling erhaelt ein `join` pro bereits anwesendem Mitglied.
    /// Gibt die Mitgliedschaft und die Empfangs-Queue der Verbindung zurueck.
    pub fn beitreten(
        &self,
        raum: RoomId,
        subject: impl Into<String>,
    ) -> SignalingResult<(Mitgliedschaft, mpsc::Receiver<String>)> {
        let subject = subject.into();
        let verbindung = ConnectionId::new();
        let (sender, rx) = ClientSender::neu(verbindung);
        let join = SystemEvent::Join {
            user: subject.clone(),
        }
        .to_json()?;

        {
            let mut gruppe = self.inner.entry(raum.clone()).or_default();
            if gruppe.mitglieder.len() >= RAUM_KAPAZITAET {
                tracing::warn!(raum = %raum, subject = %subject, "Raum voll - Beitritt abgelehnt");
                return Err(SignalingError::RaumVoll);
            }

            for anwesend in &gruppe.mitglieder {
                anwesend.sender.senden(join.clone());
                let roster = SystemEvent::Join {
                    user: anwesend.subject.clone(),
                }
                .to_json()?;
                sender.senden(roster);
            }

            gruppe.mitglieder.push(Mitglied {
                subject: subject.clone(),
                sender,
            });
        }

        tracing::info!(raum = %raum, subject = %subject, verbindung = %verbindung, "Raum beigetreten");

        let mitgliedschaft = Mitgliedschaft {
            registry: self.clone(),
            raum,
            verbindung,
            subject,
        };
        Ok((mitgliedschaft, rx))
    }

    /// Leitet einen Frame an alle anderen Mitglieder des Raums weiter
    ///
    /// Gibt die Anzahl der Empfaenger zurueck.
    pub fn weiterleiten(&self, von: &Mitgliedschaft, frame: &str) -> usize {
        match self.inner.get(&von.raum) {
            Some(gruppe) => gruppe.an_andere_senden(&von.verbindung, frame),
            None => 0,
        }
    }

    /// Entfernt eine Verbindung (nur ueber `Mitgliedschaft::drop`)
    fn verlassen(&self, raum: &RoomId, verbindung: &ConnectionId) {
        let subject = match self.inner.get_mut(raum) {
            Some(mut gruppe) => {
                let Some(pos) = gruppe
                    .mitglieder
                    .iter()
                    .position(|m| &m.sender.verbindung == verbindung)
                else {
                    return;
                };
                let mitglied = gruppe.mitglieder.remove(pos);

                match (SystemEvent::Leave {
                    user: mitglied.subject.clone(),
                })
                .to_json()
                {
                    Ok(leave) => {
                        gruppe.an_andere_senden(verbindung, &leave);
                    }
                    Err(e) => tracing::error!(fehler = %e, "leave-Ereignis nicht serialisierbar"),
                }
                mitglied.subject
            }
            None => return,
        };

        // Ausserhalb des Shard-Locks, sonst Deadlock
        let verworfen = self
            .inner
            .remove_if(raum, |_, gruppe| gruppe.mitglieder.is_empty())
            .is_some();

        tracing::info!(
            raum = %raum,
            subject = %subject,
            verbindung = %verbindung,
            raum_verworfen = verworfen,
            "Raum verlassen"
        );
    }

    /// Anzahl der aktiven Raeume
    pub fn raum_anzahl(&self) -> usize {
        self.inner.len()
    }

    /// Anzahl der Mitglieder eines Raums (0 wenn unbekannt)
    pub fn mitglieder_anzahl(&self, raum: &RoomId) -> usize {
        self.inner
            .get(raum)
            .map(|g| g.mitglieder.len())
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Mitgliedschaft
// ---------------------------------------------------------------------------

/// Mitgliedschaft einer Verbindung in einem Raum (RAII)
#[derive(Debug)]
pub struct Mitgliedschaft {
    registry: RoomRegistry,
    raum: RoomId,
    verbindung: ConnectionId,
    subject: String,
}

impl Mitgliedschaft {
    pub fn raum(&self) -> &RoomId {
        &self.raum
    }

    pub fn verbindung(&self) -> ConnectionId {
        self.verbindung
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Leitet einen Frame an die anderen Mitglieder weiter
    pub fn weiterleiten(&self, frame: &str) -> usize {
        self.registry.weiterleiten(self, frame)
    }
}

impl Drop for Mitgliedschaft {
    fn drop(&mut self) {
        self.registry.verlassen(&self.raum, &self.verbindung);
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("raeume", &self.inner.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
