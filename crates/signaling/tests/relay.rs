//! Relay ueber echte WebSockets auf `127.0.0.1:0`

use futures_util::{SinkExt, StreamExt};
use kammer_auth::{token_ttl, IdentityClaim, RoomBindingClaim, TokenCodec};
use kammer_core::RoomId;
use kammer_signaling::{RelayConfig, RelayState, SignalingServer};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const GEHEIMNIS: &[u8] = b"relay-test";

struct TestRelay {
    adresse: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    codec: TokenCodec,
}

impl TestRelay {
    async fn starten() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = RelayState::neu(
            TokenCodec::neu(GEHEIMNIS),
            RelayConfig::default(),
            shutdown_rx,
        );
        let server = SignalingServer::binden(state, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let adresse = server.lokale_adresse().unwrap();
        tokio::spawn(server.starten());

        Self {
            adresse,
            shutdown_tx,
            codec: TokenCodec::neu(GEHEIMNIS),
        }
    }

    fn url(&self, name: &str, raum: &RoomId) -> String {
        let token = self
            .codec
            .signieren(IdentityClaim::neu(name), token_ttl())
            .unwrap();
        let sig = self
            .codec
            .signieren(RoomBindingClaim::neu(raum.clone()), token_ttl())
            .unwrap();
        format!("ws://{}/ws?token={token}&sigToken={sig}", self.adresse)
    }

    async fn verbinden(&self, name: &str, raum: &RoomId) -> Ws {
        let (ws, _) = connect_async(self.url(name, raum)).await.unwrap();
        ws
    }
}

async fn naechstes_json(ws: &mut Ws) -> Value {
    let nachricht = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timeout beim Warten auf Frame")
        .unwrap()
        .unwrap();
    match nachricht {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        andere => panic!("Textframe erwartet, erhalten: {andere:?}"),
    }
}

async fn bleibt_still(ws: &mut Ws) {
    let ergebnis = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(ergebnis.is_err(), "Unerwarteter Frame: {ergebnis:?}");
}

#[tokio::test]
async fn join_roster_und_weiterleitung() {
    let relay = TestRelay::starten().await;
    let raum = RoomId::generieren();

    let mut a = relay.verbinden("alice", &raum).await;
    let mut b = relay.verbinden("bob", &raum).await;

    assert_eq!(naechstes_json(&mut a).await, json!({"type": "join", "user": "bob"}));
    assert_eq!(naechstes_json(&mut b).await, json!({"type": "join", "user": "alice"}));

    let pubkey = r#"{"type":"pubkey","pubkey":"BAAA"}"#;
    a.send(Message::Text(pubkey.to_string())).await.unwrap();
    match b.next().await.unwrap().unwrap() {
        Message::Text(text) => assert_eq!(text, pubkey),
        andere => panic!("Textframe erwartet: {andere:?}"),
    }
    bleibt_still(&mut a).await;

    // Unbekannte Typen werden verworfen
    a.send(Message::Text(r#"{"type":"chat","text":"hi"}"#.into()))
        .await
        .unwrap();
    a.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
    bleibt_still(&mut b).await;
}

#[tokio::test]
async fn dritter_teilnehmer_bekommt_409() {
    let relay = TestRelay::starten().await;
    let raum = RoomId::generieren();

    let _a = relay.verbinden("alice", &raum).await;
    let _b = relay.verbinden("bob", &raum).await;

    match connect_async(relay.url("carol", &raum)).await {
        Err(WsError::Http(antwort)) => assert_eq!(antwort.status().as_u16(), 409),
        andere => panic!("Ablehnung erwartet: {:?}", andere.map(|_| ())),
    }
}

#[tokio::test]
async fn ungueltiges_token_bekommt_401() {
    let relay = TestRelay::starten().await;
    let url = format!("ws://{}/ws?token=kaputt&sigToken=kaputt", relay.adresse);

    match connect_async(url).await {
        Err(WsError::Http(antwort)) => assert_eq!(antwort.status().as_u16(), 401),
        andere => panic!("Ablehnung erwartet: {:?}", andere.map(|_| ())),
    }
}

#[tokio::test]
async fn raeume_sind_isoliert() {
    let relay = TestRelay::starten().await;
    let x = RoomId::generieren();
    let y = RoomId::generieren();

    let mut a = relay.verbinden("alice", &x).await;
    let mut b = relay.verbinden("bob", &x).await;
    let mut c = relay.verbinden("carol", &y).await;
    naechstes_json(&mut a).await;
    naechstes_json(&mut b).await;

    a.send(Message::Text(r#"{"type":"offer","sdp":{"sdp":"v=0"}}"#.into()))
        .await
        .unwrap();
    assert_eq!(naechstes_json(&mut b).await["type"], "offer");
    bleibt_still(&mut c).await;
}

#[tokio::test]
async fn trennen_meldet_leave() {
    let relay = TestRelay::starten().await;
    let raum = RoomId::generieren();

    let mut a = relay.verbinden("alice", &raum).await;
    let mut b = relay.verbinden("bob", &raum).await;
    naechstes_json(&mut a).await;
    naechstes_json(&mut b).await;

    a.close(None).await.unwrap();
    assert_eq!(naechstes_json(&mut b).await, json!({"type": "leave", "user": "alice"}));
}

#[tokio::test]
async fn shutdown_schliesst_verbindungen() {
    let relay = TestRelay::starten().await;
    let raum = RoomId::generieren();
    let mut a = relay.verbinden("alice", &raum).await;

    relay.shutdown_tx.send(true).unwrap();

    let ende = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(Ok(nachricht)) = a.next().await {
            if let Message::Close(_) = nachricht {
                break;
            }
        }
    })
    .await;
    assert!(ende.is_ok(), "Verbindung wurde nicht geschlossen");
}
