//! Structured Logging Setup via tracing-subscriber
//!
//! Level und Format kommen aus der Server-Konfiguration und koennen per
//! Umgebungsvariable ueberschrieben werden:
//! - `KAMMER_LOG_LEVEL`: EnvFilter-Direktive (z.B. `debug` oder
//!   `info,kammer_signaling=trace`), Standard: info
//! - `KAMMER_LOG_FORMAT`: `text` oder `json`, Standard: text

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "KAMMER_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "KAMMER_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Ungueltiger Log-Filter '{filter}': {grund}")]
    Filter { filter: String, grund: String },

    #[error("Unbekanntes Log-Format '{0}' (erlaubt: text, json)")]
    Format(String),

    #[error("Logging bereits initialisiert")]
    BereitsInitialisiert,
}

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            andere => Err(LoggingError::Format(andere.to_string())),
        }
    }
}

/// Logging-Abschnitt der Konfiguration (`[logging]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingEinstellungen {
    /// Uebernimmt `KAMMER_LOG_LEVEL` / `KAMMER_LOG_FORMAT` falls gesetzt
    pub fn mit_env(self) -> Result<Self, LoggingError> {
        self.ueberschreiben(
            std::env::var(ENV_LOG_LEVEL).ok(),
            std::env::var(ENV_LOG_FORMAT).ok(),
        )
    }

    fn ueberschreiben(
        mut self,
        level: Option<String>,
        format: Option<String>,
    ) -> Result<Self, LoggingError> {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
            self.format = format.trim().parse()?;
        }
        Ok(self)
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::Filter {
            filter: self.level.clone(),
            grund: e.to_string(),
        })
    }
}

/// Initialisiert das Logging-System (einmal pro Prozess)
pub fn logging_initialisieren(einstellungen: &LoggingEinstellungen) -> Result<(), LoggingError> {
    let filter = einstellungen.filter()?;

    let ergebnis = match einstellungen.format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    ergebnis.map_err(|_| LoggingError::BereitsInitialisiert)
}
