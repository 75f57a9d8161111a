//! Send-Queues der Relay-Verbindungen
//!
//! Jede Verbindung bekommt eine begrenzte Queue. Die Registry schreibt
//! nicht-blockierend hinein, der Verbindungs-Task liest und sendet ueber
//! den WebSocket. Ist die Queue voll, wird der Frame verworfen.

use kammer_core::ConnectionId;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Relay-Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindung: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl ClientSender {
    /// Erstellt eine neue Send-Queue und gibt Sender und Empfaenger zurueck
    pub fn neu(verbindung: ConnectionId) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        (Self { verbindung, tx }, rx)
    }

    /// Reiht einen Textframe nicht-blockierend ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, frame: String) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.verbindung, "Send-Queue voll - Frame verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.verbindung, "Send-Queue geschlossen (Verbindung getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn senden_und_empfangen() {
        let (sender, mut rx) = ClientSender::neu(ConnectionId::new());
        assert!(sender.senden("a".into()));
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
    }

    #[test]
    fn volle_queue_verwirft() {
        let (sender, _rx) = ClientSender::neu(ConnectionId::new());
        for i in 0..SEND_QUEUE_GROESSE {
            assert!(sender.senden(i.to_string()));
        }
        assert!(!sender.senden("zu viel".into()));
    }

    #[test]
    fn geschlossene_queue_verwirft() {
        let (sender, rx) = ClientSender::neu(ConnectionId::new());
        drop(rx);
        assert!(!sender.senden("weg".into()));
    }
}
