//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, sodass der Relay ohne Konfigurationsdatei lauffaehig ist.
//! Danach ueberschreiben die Umgebungsvariablen `JWT_SECRET`, `PORT` und
//! `ORIGIN` die Datei.

use anyhow::Context;
use kammer_observability::LoggingEinstellungen;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Standard-Signierschluessel, nur fuer lokale Entwicklung
pub const STANDARD_GEHEIMNIS: &str = "change_me";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Relay-Einstellungen
    pub relay: RelayEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Relay-Einstellungen
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayEinstellungen {
    /// Bind-Adresse des Relays
    pub bind_adresse: IpAddr,
    /// Port fuer HTTP und WebSocket
    pub port: u16,
    /// Einziger erlaubter Ursprung (CORS, WebSocket-Handshake)
    pub ursprung: String,
    /// HMAC-Schluessel fuer Identitaets- und Raum-Tokens
    pub jwt_secret: String,
}

impl Default for RelayEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            ursprung: "http://localhost:5173".into(),
            jwt_secret: STANDARD_GEHEIMNIS.into(),
        }
    }
}

impl std::fmt::Debug for RelayEinstellungen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayEinstellungen")
            .field("bind_adresse", &self.bind_adresse)
            .field("port", &self.port)
            .field("ursprung", &self.ursprung)
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Uebernimmt `JWT_SECRET`, `PORT`, `ORIGIN` und die Logging-Variablen
    pub fn mit_env(self) -> anyhow::Result<Self> {
        let mut config = self.ueberschreiben(|name| std::env::var(name).ok())?;
        config.logging = config.logging.mit_env()?;
        Ok(config)
    }

    fn ueberschreiben(
        mut self,
        variable: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(geheimnis) = variable("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.relay.jwt_secret = geheimnis;
        }
        if let Some(port) = variable("PORT") {
            self.relay.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT ist keine gueltige Portnummer: '{port}'"))?;
        }
        if let Some(ursprung) = variable("ORIGIN").filter(|s| !s.is_empty()) {
            self.relay.ursprung = ursprung;
        }
        Ok(self)
    }

    /// Ob noch der Entwicklungs-Schluessel konfiguriert ist
    pub fn standard_geheimnis(&self) -> bool {
        self.relay.jwt_secret == STANDARD_GEHEIMNIS
    }

    /// Gibt die vollstaendige Bind-Adresse des Relays zurueck
    pub fn relay_bind_adresse(&self) -> SocketAddr {
        SocketAddr::new(self.relay.bind_adresse, self.relay.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kammer_observability::LogFormat;
    use std::collections::HashMap;

    fn env(paare: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let werte: HashMap<String, String> = paare
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| werte.get(name).cloned()
    }

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.relay.port, 4000);
        assert_eq!(cfg.relay.ursprung, "http://localhost:5173");
        assert!(cfg.standard_geheimnis());
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.relay_bind_adresse().to_string(), "0.0.0.0:4000");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [relay]
            port = 8080
            ursprung = "https://kammer.example"

            [logging]
            format = "json"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.relay.port, 8080);
        assert_eq!(cfg.relay.ursprung, "https://kammer.example");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        // Nicht angegebene Felder behalten Standardwerte
        assert!(cfg.standard_geheimnis());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn env_ueberschreibt_datei() {
        let cfg = ServerConfig::default()
            .ueberschreiben(env(&[
                ("JWT_SECRET", "s3cr3t"),
                ("PORT", "4100"),
                ("ORIGIN", "https://chat.example"),
            ]))
            .unwrap();
        assert_eq!(cfg.relay.jwt_secret, "s3cr3t");
        assert_eq!(cfg.relay.port, 4100);
        assert_eq!(cfg.relay.ursprung, "https://chat.example");
        assert!(!cfg.standard_geheimnis());
    }

    #[test]
    fn ungueltiger_port_ist_fehler() {
        assert!(ServerConfig::default()
            .ueberschreiben(env(&[("PORT", "vierzig")]))
            .is_err());
    }

    #[test]
    fn leeres_geheimnis_wird_ignoriert() {
        let cfg = ServerConfig::default()
            .ueberschreiben(env(&[("JWT_SECRET", "")]))
            .unwrap();
        assert!(cfg.standard_geheimnis());
    }

    #[test]
    fn fehlende_datei_ergibt_standardwerte() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/kammer.toml").unwrap();
        assert_eq!(cfg.relay.port, 4000);
    }

    #[test]
    fn debug_zeigt_kein_geheimnis() {
        let mut cfg = ServerConfig::default();
        cfg.relay.jwt_secret = "streng-geheim".into();
        let ausgabe = format!("{cfg:?}");
        assert!(!ausgabe.contains("streng-geheim"));
        assert!(ausgabe.contains("[REDACTED]"));
    }
}
