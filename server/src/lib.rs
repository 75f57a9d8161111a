//! kammer-server – Bibliotheks-Root
//!
//! Stellt den Server-Einstiegspunkt fuer `main` und Integrationstests bereit.

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use kammer_auth::TokenCodec;
use kammer_signaling::{RelayConfig, RelayState, SignalingServer};
use std::future::Future;
use tokio::sync::watch;

/// Haelt den Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Baut den Relay-Zustand und bindet den Listener
    pub async fn binden(&self, shutdown_rx: watch::Receiver<bool>) -> Result<SignalingServer> {
        if self.config.standard_geheimnis() {
            tracing::warn!(
                "JWT_SECRET nicht gesetzt - Standard-Schluessel aktiv, nur fuer Entwicklung geeignet"
            );
        }

        let state = RelayState::neu(
            TokenCodec::neu(self.config.relay.jwt_secret.as_bytes()),
            RelayConfig {
                erlaubter_ursprung: self.config.relay.ursprung.clone(),
            },
            shutdown_rx,
        );

        let adresse = self.config.relay_bind_adresse();
        SignalingServer::binden(state, adresse)
            .await
            .with_context(|| format!("Relay konnte nicht an {adresse} binden"))
    }

    /// Startet den Relay und laeuft bis das Shutdown-Signal `true` wird
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let relay = self.binden(shutdown_rx).await?;
        relay.starten().await.context("Relay beendet mit Fehler")?;
        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Setzt das Shutdown-Signal sobald `signal` eintrifft
///
/// Schlaegt das Abwarten fehl, wird nichts gesendet und der Sender bleibt
/// offen, der Server laeuft dann ohne Signal-Handler weiter.
pub async fn shutdown_bei_signal<F>(signal: F, shutdown_tx: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            let _ = shutdown_tx.send(true);
        }
        Err(e) => {
            tracing::error!(fehler = %e, "Signal-Handler fehlgeschlagen");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.relay.bind_adresse = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.relay.port = 0;
        config.relay.jwt_secret = "server-test".into();
        config
    }

    #[tokio::test]
    async fn health_und_graceful_shutdown() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let relay = Server::neu(test_config()).binden(shutdown_rx).await.unwrap();
        let adresse = relay.lokale_adresse().unwrap();
        let lauf = tokio::spawn(relay.starten());

        let mut stream = TcpStream::connect(adresse).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut antwort = String::new();
        stream.read_to_string(&mut antwort).await.unwrap();
        assert!(antwort.starts_with("HTTP/1.1 200"), "{antwort}");
        assert!(antwort.contains(r#"{"status":"ok"}"#));

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), lauf)
            .await
            .expect("Relay stoppt nicht")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn signal_setzt_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        shutdown_bei_signal(async { Ok::<(), std::io::Error>(()) }, tx).await;
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn fehlerhafter_signal_handler_beendet_nicht() {
        let (tx, rx) = watch::channel(false);
        let handler = tokio::spawn(shutdown_bei_signal(
            async { Err::<(), _>(std::io::Error::other("kein Signal")) },
            tx,
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handler.is_finished());
        assert!(!*rx.borrow());
        assert!(rx.has_changed().is_ok(), "Sender wurde verworfen");
        handler.abort();
    }

    #[tokio::test]
    async fn belegter_port_ist_fehler() {
        let (_tx, rx) = watch::channel(false);
        let erster = Server::neu(test_config()).binden(rx.clone()).await.unwrap();

        let mut config = test_config();
        config.relay.port = erster.lokale_adresse().unwrap().port();
        assert!(Server::neu(config).binden(rx).await.is_err());
    }
}
