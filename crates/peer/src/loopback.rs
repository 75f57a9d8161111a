//! In-Memory-Transportpaar
//!
//! Bildet die Reihenfolge-Regeln eines echten Peer-Transports nach:
//! - Kandidaten werden erst nach der Remote-Beschreibung angenommen
//! - Der Kanal oeffnet sich, sobald beide Seiten lokale und Remote-Beschreibung
//!   haben und je mindestens einen Remote-Kandidaten erhalten haben
//! - `close` meldet dem Peer `Closed`, danach schlaegt `send` fehl

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::transport::{PeerTransport, TransportError, TransportEvent, TransportResult};

#[derive(Debug)]
struct Seite {
    lokal: bool,
    remote: bool,
    kandidat_empfangen: bool,
    geschlossen: bool,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl Seite {
    fn neu(events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            lokal: false,
            remote: false,
            kandidat_empfangen: false,
            geschlossen: false,
            events,
        }
    }

    fn melden(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    fn bereit(&self) -> bool {
        self.lokal && self.remote && self.kandidat_empfangen && !self.geschlossen
    }
}

#[derive(Debug)]
struct Verbindung {
    seiten: [Seite; 2],
    offen: bool,
}

impl Verbindung {
    fn oeffnen_wenn_bereit(&mut self) {
        if !self.offen && self.seiten.iter().all(Seite::bereit) {
            self.offen = true;
            for seite in &self.seiten {
                seite.melden(TransportEvent::ChannelOpen);
            }
        }
    }
}

/// Eine Seite eines In-Memory-Transportpaars
#[derive(Debug)]
pub struct LoopbackTransport {
    index: usize,
    verbindung: Arc<Mutex<Verbindung>>,
}

impl LoopbackTransport {
    /// Erzeugt zwei verbundene Transporte samt ihren Event-Empfaengern
    #[allow(clippy::type_complexity)]
    pub fn paar() -> (
        (Self, mpsc::UnboundedReceiver<TransportEvent>),
        (Self, mpsc::UnboundedReceiver<TransportEvent>),
    ) {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        let verbindung = Arc::new(Mutex::new(Verbindung {
            seiten: [Seite::neu(tx_a), Seite::neu(tx_b)],
            offen: false,
        }));

        (
            (
                Self {
                    index: 0,
                    verbindung: Arc::clone(&verbindung),
                },
                rx_a,
            ),
            (Self { index: 1, verbindung }, rx_b),
        )
    }

    /// Simuliert einen Transportausfall auf dieser Seite
    pub fn fehler_ausloesen(&self, grund: &str) {
        let v = self.verbindung.lock();
        v.seiten[self.index].melden(TransportEvent::Failed(grund.to_string()));
    }

    fn peer(&self) -> usize {
        1 - self.index
    }

    fn kandidat(&self) -> Value {
        json!({
            "candidate": format!("candidate:{} 1 udp 2122260223 127.0.0.1 {} typ host", self.index + 1, 50000 + self.index),
            "sdpMid": "0",
            "sdpMLineIndex": 0,
        })
    }

    fn beschreibung(&self, typ: &str) -> Value {
        json!({
            "type": typ,
            "sdp": format!("v=0\r\no=loopback {} 0 IN IP4 127.0.0.1\r\ns=-\r\n", self.index + 1),
        })
    }
}

fn typ_pruefen(beschreibung: &Value, erwartet: &str) -> TransportResult<()> {
    match beschreibung.get("type").and_then(Value::as_str) {
        Some(typ) if typ == erwartet => Ok(()),
        _ => Err(TransportError::Zustand(format!("{erwartet} erwartet"))),
    }
}

#[async_trait]
impl PeerTransport for LoopbackTransport {
    async fn create_offer(&mut self) -> TransportResult<Value> {
        let mut v = self.verbindung.lock();
        let seite = &mut v.seiten[self.index];
        if seite.geschlossen || seite.lokal || seite.remote {
            return Err(TransportError::Zustand("Offer nicht moeglich".into()));
        }
        seite.lokal = true;
        seite.melden(TransportEvent::LocalCandidate(self.kandidat()));
        Ok(self.beschreibung("offer"))
    }

    async fn accept_offer(&mut self, offer: &Value) -> TransportResult<Value> {
        typ_pruefen(offer, "offer")?;
        let mut v = self.verbindung.lock();
        let seite = &mut v.seiten[self.index];
        if seite.geschlossen || seite.lokal || seite.remote {
            return Err(TransportError::Zustand("Offer nicht annehmbar".into()));
        }
        seite.remote = true;
        seite.lokal = true;
        seite.melden(TransportEvent::LocalCandidate(self.kandidat()));
        v.oeffnen_wenn_bereit();
        Ok(self.beschreibung("answer"))
    }

    async fn accept_answer(&mut self, answer: &Value) -> TransportResult<()> {
        typ_pruefen(answer, "answer")?;
        let mut v = self.verbindung.lock();
        let seite = &mut v.seiten[self.index];
        if seite.geschlossen || !seite.lokal || seite.remote {
            return Err(TransportError::Zustand("Answer ohne eigenes Offer".into()));
        }
        seite.remote = true;
        v.oeffnen_wenn_bereit();
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: &Value) -> TransportResult<()> {
        if candidate.get("candidate").is_none() {
            return Err(TransportError::Zustand("Kandidat ohne candidate-Feld".into()));
        }
        let mut v = self.verbindung.lock();
        let seite = &mut v.seiten[self.index];
        if !seite.remote {
            return Err(TransportError::Zustand(
                "Kandidat vor Remote-Beschreibung".into(),
            ));
        }
        seite.kandidat_empfangen = true;
        v.oeffnen_wenn_bereit();
        Ok(())
    }

    async fn send(&mut self, text: String) -> TransportResult<()> {
        let v = self.verbindung.lock();
        let peer = &v.seiten[self.peer()];
        if !v.offen || v.seiten[self.index].geschlossen || peer.geschlossen {
            return Err(TransportError::KanalGeschlossen);
        }
        peer.melden(TransportEvent::Message(text));
        Ok(())
    }

    async fn close(&mut self) {
        let mut v = self.verbindung.lock();
        if v.seiten[self.index].geschlossen {
            return;
        }
        v.seiten[self.index].geschlossen = true;
        let peer = &v.seiten[self.peer()];
        if !peer.geschlossen {
            peer.melden(TransportEvent::Closed);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
