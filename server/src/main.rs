//! Kammer Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Relay.

use anyhow::Result;
use kammer_observability::logging_initialisieren;
use kammer_server::{config::ServerConfig, shutdown_bei_signal, Server};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("KAMMER_CONFIG").unwrap_or_else(|_| "kammer.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt), dann Umgebung
    let config = ServerConfig::laden(&config_pfad)?.mit_env()?;

    logging_initialisieren(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        adresse = %config.relay_bind_adresse(),
        "Kammer Server wird initialisiert"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(shutdown_bei_signal(tokio::signal::ctrl_c(), shutdown_tx));

    Server::neu(config).starten(shutdown_rx).await
}
