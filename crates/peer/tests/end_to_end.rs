//! Kompletter Ablauf: Login, Raum, Relay, Verhandlung, verschluesselte Nachricht

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use kammer_auth::TokenCodec;
use kammer_peer::{
    LoopbackTransport, PeerSession, SessionEvent, SessionState, SignalingClient, TransportEvent,
};
use kammer_protocol::{LoginResponse, RelayMessage, RoomResponse};
use kammer_signaling::{router, RelayConfig, RelayState, SignalingServer};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tower::ServiceExt;

const GEHEIMNIS: &[u8] = b"ende-zu-ende";

async fn json<T: serde::de::DeserializeOwned>(app: &Router, anfrage: Request<Body>) -> T {
    let antwort = app.clone().oneshot(anfrage).await.unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);
    let bytes = to_bytes(antwort.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, name: &str) -> String {
    let anfrage = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"username":"{name}"}}"#)))
        .unwrap();
    let antwort: LoginResponse = json(app, anfrage).await;
    assert!(antwort.ok);
    antwort.token
}

async fn neuer_raum(app: &Router) -> RoomResponse {
    json(app, Request::get("/rooms/new").body(Body::empty()).unwrap()).await
}

async fn raum_token(app: &Router, identitaet: &str, room_id: &str) -> RoomResponse {
    let anfrage = Request::get(format!("/rooms/{room_id}/token"))
        .header(header::AUTHORIZATION, format!("Bearer {identitaet}"))
        .body(Body::empty())
        .unwrap();
    json(app, anfrage).await
}

enum Eingang {
    Relay(RelayMessage),
    Transport(TransportEvent),
}

struct Teilnehmer {
    client: SignalingClient,
    session: PeerSession<LoopbackTransport>,
    transport: mpsc::UnboundedReceiver<TransportEvent>,
    events: Vec<SessionEvent>,
}

impl Teilnehmer {
    fn neu(
        name: &str,
        client: SignalingClient,
        (transport, events): (LoopbackTransport, mpsc::UnboundedReceiver<TransportEvent>),
    ) -> Self {
        let session = PeerSession::neu(name, transport, client.sender());
        Self {
            client,
            session,
            transport: events,
            events: Vec::new(),
        }
    }

    async fn naechstes(&mut self) -> Eingang {
        tokio::select! {
            Some(nachricht) = self.client.empfangen() => Eingang::Relay(nachricht),
            Some(event) = self.transport.recv() => Eingang::Transport(event),
            else => panic!("Relay und Transport geschlossen"),
        }
    }

    async fn verarbeiten(&mut self, eingang: Eingang) {
        let events = match eingang {
            Eingang::Relay(nachricht) => self.session.handle_relay_message(nachricht).await,
            Eingang::Transport(event) => self.session.handle_transport_event(event).await,
        };
        self.events.extend(events.unwrap());
    }
}

/// Treibt beide Teilnehmer bis `fertig` zutrifft
async fn treiben(
    a: &mut Teilnehmer,
    b: &mut Teilnehmer,
    fertig: impl Fn(&Teilnehmer, &Teilnehmer) -> bool,
) {
    let lauf = async {
        while !fertig(a, b) {
            let (erster, eingang) = tokio::select! {
                e = a.naechstes() => (true, e),
                e = b.naechstes() => (false, e),
            };
            if erster {
                a.verarbeiten(eingang).await;
            } else {
                b.verarbeiten(eingang).await;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), lauf)
        .await
        .expect("Timeout beim Treiben der Sessions");
}

#[tokio::test]
async fn zwei_peers_tauschen_verschluesselt_aus_dritter_sieht_nichts() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = RelayState::neu(TokenCodec::neu(GEHEIMNIS), RelayConfig::default(), shutdown_rx);
    let app = router(state.clone()).unwrap();

    // HTTP: Identitaeten und Raumbindungen
    let token_a = login(&app, "alice").await;
    let token_b = login(&app, "bob").await;
    let token_c = login(&app, "carol").await;

    let raum = neuer_raum(&app).await;
    let raum_b = raum_token(&app, &token_b, raum.room_id.as_str()).await;
    assert_eq!(raum_b.room_id, raum.room_id);
    let anderer_raum = neuer_raum(&app).await;

    // Relay auf einem freien Port
    let server = SignalingServer::binden(state, "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let basis = format!("ws://{}", server.lokale_adresse().unwrap());
    tokio::spawn(server.starten());

    let client_a = SignalingClient::verbinden(&basis, &token_a, &raum.sig_token)
        .await
        .unwrap();
    let client_b = SignalingClient::verbinden(&basis, &token_b, &raum_b.sig_token)
        .await
        .unwrap();
    let mut client_c = SignalingClient::verbinden(&basis, &token_c, &anderer_raum.sig_token)
        .await
        .unwrap();

    let (transport_a, transport_b) = LoopbackTransport::paar();
    let mut alice = Teilnehmer::neu("alice", client_a, transport_a);
    let mut bob = Teilnehmer::neu("bob", client_b, transport_b);

    treiben(&mut alice, &mut bob, |a, b| {
        a.session.state() == SessionState::Connected && b.session.state() == SessionState::Connected
    })
    .await;
    assert!(alice
        .events
        .contains(&SessionEvent::PeerBeigetreten("bob".into())));
    assert!(bob
        .events
        .contains(&SessionEvent::PeerBeigetreten("alice".into())));

    alice.session.send_text("hello").await.unwrap();
    treiben(&mut alice, &mut bob, |_, b| {
        b.events
            .contains(&SessionEvent::NachrichtEmpfangen("hello".into()))
    })
    .await;

    // Carol ist allein in einem anderen Raum und hat nichts gesehen
    let still = tokio::time::timeout(Duration::from_millis(300), client_c.empfangen()).await;
    assert!(still.is_err(), "Carol hat etwas empfangen: {still:?}");
}

#[tokio::test]
async fn abgelehnter_handshake_liefert_status() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = RelayState::neu(TokenCodec::neu(GEHEIMNIS), RelayConfig::default(), shutdown_rx);
    let server = SignalingServer::binden(state, "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let basis = format!("ws://{}", server.lokale_adresse().unwrap());
    tokio::spawn(server.starten());

    let ergebnis = SignalingClient::verbinden(&basis, "kein.gueltiges.token", "auch.keins").await;
    assert!(matches!(
        ergebnis,
        Err(kammer_peer::SessionError::RelayAbgelehnt(401))
    ));
}
