//! Relay-Client - WebSocket-Verbindung zum Signaling-Relay
//!
//! Ein Hintergrund-Task liest Frames vom Relay und schreibt ausgehende
//! Signale. Die Anwendung sieht nur zwei Kanaele: `sender()` fuer
//! `SignalEnvelope`s und `empfangen()` fuer `RelayMessage`s.

use futures_util::{SinkExt, StreamExt};
use kammer_protocol::{RelayMessage, SignalEnvelope};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::error::{SessionError, SessionResult};

/// Verbindung eines Teilnehmers zum Relay
#[derive(Debug)]
pub struct SignalingClient {
    ausgehend: mpsc::UnboundedSender<SignalEnvelope>,
    eingehend: mpsc::UnboundedReceiver<RelayMessage>,
    task: JoinHandle<()>,
}

impl SignalingClient {
    /// Verbindet sich mit `{basis_url}/ws`
    ///
    /// `basis_url` ist z.B. `ws://127.0.0.1:4000`. Lehnt das Relay den
    /// Handshake ab, kommt der HTTP-Status als `RelayAbgelehnt` zurueck.
    pub async fn verbinden(basis_url: &str, token: &str, sig_token: &str) -> SessionResult<Self> {
        let url = format!(
            "{}/ws?token={token}&sigToken={sig_token}",
            basis_url.trim_end_matches('/')
        );

        let (ws, _antwort) = match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok(verbunden) => verbunden,
            Err(tungstenite::Error::Http(antwort)) => {
                let status = antwort.status().as_u16();
                tracing::warn!(status, "Relay hat den Handshake abgelehnt");
                return Err(SessionError::RelayAbgelehnt(status));
            }
            Err(e) => return Err(SessionError::Verbindung(e.to_string())),
        };
        tracing::info!(url = %basis_url, "Mit Relay verbunden");

        let (ausgehend, mut signale) = mpsc::unbounded_channel::<SignalEnvelope>();
        let (eingang_tx, eingehend) = mpsc::unbounded_channel();
        let (mut schreiber, mut leser) = ws.split();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = leser.next() => match frame {
                        Some(Ok(Message::Text(text))) => match RelayMessage::from_json(&text) {
                            Ok(nachricht) => {
                                if eingang_tx.send(nachricht).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::debug!(fehler = %e, "Unbekannter Frame vom Relay verworfen");
                            }
                        },
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::debug!("Relay hat die Verbindung geschlossen");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(fehler = %e, "Fehler auf der Relay-Verbindung");
                            break;
                        }
                    },
                    signal = signale.recv() => {
                        let Some(signal) = signal else {
                            let _ = schreiber.send(Message::Close(None)).await;
                            break;
                        };
                        let text = match signal.to_json() {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!(fehler = %e, "Signal nicht serialisierbar");
                                continue;
                            }
                        };
                        if let Err(e) = schreiber.send(Message::Text(text)).await {
                            tracing::warn!(fehler = %e, "Senden an Relay fehlgeschlagen");
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            ausgehend,
            eingehend,
            task,
        })
    }

    /// Sender fuer ausgehende Signale (fuer `PeerSession::neu`)
    pub fn sender(&self) -> mpsc::UnboundedSender<SignalEnvelope> {
        self.ausgehend.clone()
    }

    /// Naechste Nachricht vom Relay, `None` wenn die Verbindung zu ist
    pub async fn empfangen(&mut self) -> Option<RelayMessage> {
        self.eingehend.recv().await
    }
}

impl Drop for SignalingClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}
