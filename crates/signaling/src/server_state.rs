//! Gemeinsamer Zustand des Relays
//!
//! Haelt Token-Codec, Raum-Registry und Konfiguration als Arc-Referenzen,
//! die sicher zwischen tokio-Tasks und Axum-Handlern geteilt werden.

use kammer_auth::TokenCodec;
use std::sync::Arc;
use tokio::sync::watch;

use crate::registry::RoomRegistry;

/// Konfiguration des Relays
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Einziger erlaubter Ursprung fuer CORS und WebSocket-Handshake
    pub erlaubter_ursprung: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            erlaubter_ursprung: "http://localhost:5173".to_string(),
        }
    }
}

/// Gemeinsamer Relay-Zustand (Clone teilt den inneren Zustand)
#[derive(Clone)]
pub struct RelayState {
    pub codec: Arc<TokenCodec>,
    pub registry: RoomRegistry,
    pub config: Arc<RelayConfig>,
    /// Wird `true` wenn der Server herunterfaehrt
    pub shutdown_rx: watch::Receiver<bool>,
}

impl RelayState {
    pub fn neu(codec: TokenCodec, config: RelayConfig, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            codec: Arc::new(codec),
            registry: RoomRegistry::neu(),
            config: Arc::new(config),
            shutdown_rx,
        }
    }
}
