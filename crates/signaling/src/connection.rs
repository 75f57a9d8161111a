//! Relay-Verbindung - ein WebSocket pro Raummitglied
//!
//! Jede Verbindung laeuft in einem eigenen tokio-Task. Sie liest Textframes
//! vom Client, prueft nur den `type`-Diskriminator und reicht erlaubte
//! Frames unveraendert an die anderen Mitglieder weiter. In die Gegenrichtung
//! leert sie die eigene Send-Queue auf den Socket.
//!
//! ## Ende der Verbindung
//! - Client schliesst oder Socket-Fehler
//! - Shutdown-Signal des Servers (Close-Frame wird gesendet)
//!
//! In jedem Fall faellt die `Mitgliedschaft` und der Raum erfaehrt ein `leave`.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use kammer_protocol::SignalKind;
use tokio::sync::{mpsc, watch};

use crate::registry::Mitgliedschaft;

/// Verarbeitet eine einzelne Relay-Verbindung
pub struct RelayConnection {
    mitgliedschaft: Mitgliedschaft,
}

impl RelayConnection {
    pub fn neu(mitgliedschaft: Mitgliedschaft) -> Self {
        Self { mitgliedschaft }
    }

    /// Prueft einen eingehenden Textframe und leitet ihn ggf. weiter
    ///
    /// Gibt die Anzahl der Empfaenger zurueck, `None` wenn der Frame
    /// verworfen wurde.
    pub fn frame_weiterleiten(&self, frame: &str) -> Option<usize> {
        match SignalKind::aus_text(frame) {
            Some(art) => {
                let empfaenger = self.mitgliedschaft.weiterleiten(frame);
                tracing::trace!(
                    raum = %self.mitgliedschaft.raum(),
                    art = ?art,
                    empfaenger,
                    "Frame weitergeleitet"
                );
                Some(empfaenger)
            }
            None => {
                tracing::debug!(
                    raum = %self.mitgliedschaft.raum(),
                    verbindung = %self.mitgliedschaft.verbindung(),
                    laenge = frame.len(),
                    "Unbekannter Frame verworfen"
                );
                None
            }
        }
    }

    /// Startet die Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt oder der Server herunterfaehrt.
    pub async fn verarbeiten(
        self,
        socket: WebSocket,
        mut ausgehend: mpsc::Receiver<String>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let raum = self.mitgliedschaft.raum().clone();
        let verbindung = self.mitgliedschaft.verbindung();
        let (mut ws_tx, mut ws_rx) = socket.split();

        tracing::info!(raum = %raum, verbindung = %verbindung, "Relay-Verbindung geoeffnet");

        if *shutdown_rx.borrow() {
            let _ = ws_tx.send(Message::Close(None)).await;
            return;
        }

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                eingehend = ws_rx.next() => {
                    match eingehend {
                        Some(Ok(Message::Text(text))) => {
                            self.frame_weiterleiten(&text);
                        }
                        Some(Ok(Message::Binary(daten))) => {
                            tracing::debug!(
                                verbindung = %verbindung,
                                laenge = daten.len(),
                                "Binaerframe verworfen"
                            );
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(verbindung = %verbindung, "Verbindung vom Client getrennt");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(verbindung = %verbindung, fehler = %e, "WebSocket-Lesefehler");
                            break;
                        }
                    }
                }

                // Ausgehender Frame aus der Registry
                Some(frame) = ausgehend.recv() => {
                    if let Err(e) = ws_tx.send(Message::Text(frame)).await {
                        tracing::warn!(verbindung = %verbindung, fehler = %e, "Senden fehlgeschlagen");
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(verbindung = %verbindung, "Shutdown-Signal - Verbindung wird geschlossen");
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }

        tracing::info!(raum = %raum, verbindung = %verbindung, "Relay-Verbindung beendet");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
