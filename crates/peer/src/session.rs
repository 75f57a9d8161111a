//! Peer-Session - Client-seitige Zustandsmaschine
//!
//! Die Session besitzt den Peer-Transport und das lokale Schluesselpaar. Sie
//! wird von drei Quellen getrieben:
//! - Nachrichten vom Relay (`handle_relay_message`)
//! - Meldungen des Transports (`handle_transport_event`)
//! - Eingaben der Anwendung (`starten`, `send_text`, `close`)
//!
//! Jeder Aufruf gibt die daraus entstandenen `SessionEvent`s zurueck.
//! Ausgehende Verhandlungsnachrichten gehen ueber `signal_tx` an das Relay.
//!
//! ## Fehler
//! Fatale Fehler (Schluessel-Import, abweichender Peer-Schluessel,
//! Transportfehler) setzen den Zustand auf `Failed` und geben Transport und
//! Schluessel frei. Der Fehler wird trotzdem zurueckgegeben.

use kammer_crypto::{
    decrypt_message, derive_shared_key, encrypt_message, generate_key_pair, EncryptedPayload,
    SessionKeyPair, SharedKey,
};
use kammer_protocol::{RelayMessage, SignalEnvelope, SystemEvent};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{SessionError, SessionResult};
use crate::state::{Role, SessionState};
use crate::transport::{PeerTransport, TransportError, TransportEvent};

/// Ereignisse fuer die Anwendung
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StatusGeaendert(SessionState),
    NachrichtEmpfangen(String),
    PeerBeigetreten(String),
    PeerVerlassen(String),
}

/// Peer-Session fuer genau einen Raum und einen Peer
pub struct PeerSession<T: PeerTransport> {
    subject: String,
    role: Option<Role>,
    state: SessionState,
    transport: Option<T>,
    key_pair: Option<SessionKeyPair>,
    shared_key: Option<SharedKey>,
    peer_pubkey: Option<String>,
    /// Eigenes Offer und eigene Kandidaten, fuer erneutes Ankuendigen
    local_offer: Option<Value>,
    local_candidates: Vec<Value>,
    remote_offer_accepted: bool,
    answer_accepted: bool,
    channel_open: bool,
    signal_tx: mpsc::UnboundedSender<SignalEnvelope>,
}

impl<T: PeerTransport> PeerSession<T> {
    /// Erstellt eine Session im Zustand `Idle`
    pub fn neu(
        subject: impl Into<String>,
        transport: T,
        signal_tx: mpsc::UnboundedSender<SignalEnvelope>,
    ) -> Self {
        Self {
            subject: subject.into(),
            role: None,
            state: SessionState::Idle,
            transport: Some(transport),
            key_pair: None,
            shared_key: None,
            peer_pubkey: None,
            local_offer: None,
            local_candidates: Vec::new(),
            remote_offer_accepted: false,
            answer_accepted: false,
            channel_open: false,
            signal_tx,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Ob der gemeinsame Schluessel abgeleitet ist
    pub fn schluessel_bereit(&self) -> bool {
        self.shared_key.is_some()
    }

    // -----------------------------------------------------------------------
    // Anwendung
    // -----------------------------------------------------------------------

    /// Startet die Session mit fester Rolle
    ///
    /// Erzeugt das Schluesselpaar, sendet `pubkey` und als Initiator das Offer.
    pub async fn starten(&mut self, role: Role) -> SessionResult<Vec<SessionEvent>> {
        if self.state != SessionState::Idle {
            return Err(SessionError::UngueltigerZustand(self.state));
        }

        let mut events = Vec::new();
        self.role = Some(role);

        let key_pair = generate_key_pair();
        self.signal_senden(SignalEnvelope::Pubkey {
            pubkey: key_pair.public_key_b64().to_string(),
        })?;
        self.key_pair = Some(key_pair);

        if role == Role::Initiator {
            let ergebnis = self.transport_mut()?.create_offer().await;
            let offer = match ergebnis {
                Ok(offer) => offer,
                Err(e) => return Err(self.scheitern(e.into()).await),
            };
            self.signal_senden(SignalEnvelope::Offer { sdp: offer.clone() })?;
            self.local_offer = Some(offer);
        }

        tracing::info!(subject = %self.subject, role = ?role, "Peer-Session gestartet");
        self.zustand_setzen(SessionState::AwaitingPublicKey, &mut events);

        // Peer-Schluessel kam schon vor dem Start
        if self.peer_pubkey.is_some() {
            self.schluessel_ableiten(&mut events).await?;
        }
        Ok(events)
    }

    /// Verschluesselt Text und sendet ihn direkt ueber den Peer-Kanal
    pub async fn send_text(&mut self, text: &str) -> SessionResult<Vec<SessionEvent>> {
        if self.state.ist_terminal() {
            return Err(SessionError::UngueltigerZustand(self.state));
        }
        let Some(key) = self.shared_key.as_ref() else {
            tracing::debug!(subject = %self.subject, "Senden ohne Schluessel verworfen");
            return Err(SessionError::SchluesselNichtBereit);
        };
        if self.state != SessionState::Connected {
            return Err(SessionError::KanalNichtOffen);
        }

        let frame = encrypt_message(key, text)?.to_json()?;
        let ergebnis = self.transport_mut()?.send(frame).await;
        match ergebnis {
            Ok(()) => Ok(Vec::new()),
            Err(e) => Err(self.scheitern(e.into()).await),
        }
    }

    /// Beendet die Session regulaer
    pub async fn close(&mut self) -> SessionResult<Vec<SessionEvent>> {
        let mut events = Vec::new();
        if self.state.ist_terminal() {
            return Ok(events);
        }
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        self.freigeben();
        self.zustand_setzen(SessionState::Closed, &mut events);
        tracing::info!(subject = %self.subject, "Peer-Session geschlossen");
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Relay
    // -----------------------------------------------------------------------

    /// Verarbeitet eine Nachricht vom Relay
    pub async fn handle_relay_message(
        &mut self,
        nachricht: RelayMessage,
    ) -> SessionResult<Vec<SessionEvent>> {
        match nachricht {
            RelayMessage::System(SystemEvent::Join { user }) => self.peer_beigetreten(user).await,
            RelayMessage::System(SystemEvent::Leave { user }) => {
                tracing::info!(subject = %self.subject, peer = %user, "Peer hat den Raum verlassen");
                Ok(vec![SessionEvent::PeerVerlassen(user)])
            }
            RelayMessage::Signal(signal) => {
                if self.state.ist_terminal() {
                    tracing::debug!(subject = %self.subject, "Signal nach Sessionende ignoriert");
                    return Ok(Vec::new());
                }
                match signal {
                    SignalEnvelope::Pubkey { pubkey } => self.pubkey_empfangen(pubkey).await,
                    SignalEnvelope::Offer { sdp } => self.offer_empfangen(sdp).await,
                    SignalEnvelope::Answer { sdp } => self.answer_empfangen(sdp).await,
                    SignalEnvelope::Candidate { candidate } => {
                        self.kandidat_empfangen(candidate).await
                    }
                }
            }
        }
    }

    async fn peer_beigetreten(&mut self, user: String) -> SessionResult<Vec<SessionEvent>> {
        let mut events = vec![SessionEvent::PeerBeigetreten(user.clone())];

        match self.state {
            SessionState::Idle => {
                let role = Role::aus_subjects(&self.subject, &user).ok_or_else(|| {
                    SessionError::protokoll(format!("Peer hat denselben Namen: {user}"))
                })?;
                events.extend(self.starten(role).await?);
            }
            SessionState::AwaitingPublicKey | SessionState::Negotiating => {
                self.erneut_ankuendigen()?;
            }
            _ => {}
        }
        Ok(events)
    }

    /// Sendet Schluessel, Offer und Kandidaten erneut (Peer kam spaeter dazu)
    fn erneut_ankuendigen(&self) -> SessionResult<()> {
        if let Some(key_pair) = &self.key_pair {
            self.signal_senden(SignalEnvelope::Pubkey {
                pubkey: key_pair.public_key_b64().to_string(),
            })?;
        }
        if self.role == Some(Role::Initiator) && !self.answer_accepted {
            if let Some(offer) = &self.local_offer {
                self.signal_senden(SignalEnvelope::Offer { sdp: offer.clone() })?;
                for kandidat in &self.local_candidates {
                    self.signal_senden(SignalEnvelope::Candidate {
                        candidate: kandidat.clone(),
                    })?;
                }
            }
        }
        tracing::debug!(subject = %self.subject, "Verhandlung erneut angekuendigt");
        Ok(())
    }

    async fn pubkey_empfangen(&mut self, pubkey: String) -> SessionResult<Vec<SessionEvent>> {
        let mut events = Vec::new();
        match &self.peer_pubkey {
            Some(bekannt) if *bekannt == pubkey => {
                tracing::trace!(subject = %self.subject, "Wiederholter Peer-Schluessel ignoriert");
                return Ok(events);
            }
            Some(_) => {
                return Err(self
                    .scheitern(SessionError::protokoll("Peer-Schluessel hat sich geaendert"))
                    .await);
            }
            None => self.peer_pubkey = Some(pubkey),
        }

        if self.key_pair.is_some() {
            self.schluessel_ableiten(&mut events).await?;
        }
        Ok(events)
    }

    async fn schluessel_ableiten(&mut self, events: &mut Vec<SessionEvent>) -> SessionResult<()> {
        let (Some(key_pair), Some(peer_pubkey)) = (&self.key_pair, &self.peer_pubkey) else {
            return Ok(());
        };

        match derive_shared_key(key_pair, peer_pubkey) {
            Ok(key) => self.shared_key = Some(key),
            Err(e) => return Err(self.scheitern(e.into()).await),
        }
        tracing::info!(subject = %self.subject, "Gemeinsamer Schluessel abgeleitet");

        let ziel = if self.channel_open {
            SessionState::Connected
        } else {
            SessionState::Negotiating
        };
        self.zustand_setzen(ziel, events);
        Ok(())
    }

    async fn offer_empfangen(&mut self, sdp: Value) -> SessionResult<Vec<SessionEvent>> {
        if self.state == SessionState::Idle {
            return Err(SessionError::UngueltigerZustand(self.state));
        }
        if self.role == Some(Role::Initiator) || self.remote_offer_accepted {
            tracing::warn!(subject = %self.subject, "Glare: Offer verworfen");
            return Err(SessionError::Glare);
        }

        let ergebnis = self.transport_mut()?.accept_offer(&sdp).await;
        let answer = match ergebnis {
            Ok(answer) => answer,
            Err(e) => return Err(self.scheitern(e.into()).await),
        };
        self.remote_offer_accepted = true;
        self.signal_senden(SignalEnvelope::Answer { sdp: answer })?;
        Ok(Vec::new())
    }

    async fn answer_empfangen(&mut self, sdp: Value) -> SessionResult<Vec<SessionEvent>> {
        if self.role != Some(Role::Initiator) || self.local_offer.is_none() || self.answer_accepted
        {
            return Err(SessionError::protokoll("unerwartete Answer"));
        }

        let ergebnis = self.transport_mut()?.accept_answer(&sdp).await;
        if let Err(e) = ergebnis {
            return Err(self.scheitern(e.into()).await);
        }
        self.answer_accepted = true;
        Ok(Vec::new())
    }

    async fn kandidat_empfangen(&mut self, candidate: Value) -> SessionResult<Vec<SessionEvent>> {
        if self.state == SessionState::Idle {
            return Err(SessionError::UngueltigerZustand(self.state));
        }

        let ergebnis = self.transport_mut()?.add_ice_candidate(&candidate).await;
        match ergebnis {
            Ok(()) => Ok(Vec::new()),
            Err(e) => Err(self.scheitern(e.into()).await),
        }
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Verarbeitet eine Meldung des Transports
    pub async fn handle_transport_event(
        &mut self,
        event: TransportEvent,
    ) -> SessionResult<Vec<SessionEvent>> {
        let mut events = Vec::new();
        if self.state.ist_terminal() {
            return Ok(events);
        }

        match event {
            TransportEvent::LocalCandidate(kandidat) => {
                self.signal_senden(SignalEnvelope::Candidate {
                    candidate: kandidat.clone(),
                })?;
                self.local_candidates.push(kandidat);
            }
            TransportEvent::ChannelOpen => {
                self.channel_open = true;
                tracing::info!(subject = %self.subject, "Peer-Kanal offen");
                if self.shared_key.is_some() {
                    self.zustand_setzen(SessionState::Connected, &mut events);
                }
            }
            TransportEvent::Message(frame) => {
                let Some(key) = self.shared_key.as_ref() else {
                    return Err(SessionError::SchluesselNichtBereit);
                };
                let payload = EncryptedPayload::from_json(&frame)?;
                let text = decrypt_message(key, &payload)?;
                events.push(SessionEvent::NachrichtEmpfangen(text));
            }
            TransportEvent::Failed(grund) => {
                return Err(self
                    .scheitern(TransportError::Gescheitert(grund).into())
                    .await);
            }
            TransportEvent::Closed => {
                self.transport = None;
                self.freigeben();
                self.zustand_setzen(SessionState::Closed, &mut events);
                tracing::info!(subject = %self.subject, "Peer hat den Kanal geschlossen");
            }
        }
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Intern
    // -----------------------------------------------------------------------

    fn transport_mut(&mut self) -> SessionResult<&mut T> {
        let state = self.state;
        self.transport
            .as_mut()
            .ok_or(SessionError::UngueltigerZustand(state))
    }

    fn signal_senden(&self, signal: SignalEnvelope) -> SessionResult<()> {
        self.signal_tx
            .send(signal)
            .map_err(|_| SessionError::Verbindung("Relay-Verbindung getrennt".into()))
    }

    fn zustand_setzen(&mut self, neu: SessionState, events: &mut Vec<SessionEvent>) {
        if self.state != neu {
            tracing::debug!(subject = %self.subject, von = ?self.state, nach = ?neu, "Zustandswechsel");
            self.state = neu;
            events.push(SessionEvent::StatusGeaendert(neu));
        }
    }

    fn freigeben(&mut self) {
        self.key_pair = None;
        self.shared_key = None;
        self.channel_open = false;
    }

    /// Fataler Fehler: Transport schliessen, Schluessel verwerfen, `Failed`
    async fn scheitern(&mut self, fehler: SessionError) -> SessionError {
        tracing::warn!(subject = %self.subject, fehler = %fehler, "Peer-Session gescheitert");
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        self.freigeben();
        self.state = SessionState::Failed;
        fehler
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
