//! Gemeinsame Identifikationstypen fuer Kammer
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Raum- und Verbindungs-IDs zur Compilezeit auszuschliessen.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// URL-sicheres Alphabet fuer Raum-IDs (64 Zeichen, 6 Bit pro Zeichen)
const RAUM_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Laenge einer Raum-ID in Zeichen (~60 Bit Entropie)
pub const RAUM_ID_LAENGE: usize = 10;

/// Fehler beim Parsen einer Raum-ID
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomIdFehler {
    #[error("Raum-ID muss {RAUM_ID_LAENGE} Zeichen lang sein, erhalten: {0}")]
    FalscheLaenge(usize),

    #[error("Raum-ID enthaelt ungueltiges Zeichen: {0:?}")]
    UngueltigesZeichen(char),
}

/// Kurze, zufaellige und nicht aufzaehlbare Raum-ID
///
/// Wird beim Anfordern eines Raums erzeugt und ist gleichzeitig der Name der
/// Relay-Gruppe. Bei der Deserialisierung wird das Format geprueft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Erzeugt eine neue zufaellige Raum-ID aus dem OS-Zufallsgenerator
    pub fn generieren() -> Self {
        let mut rng = OsRng;
        let id = (0..RAUM_ID_LAENGE)
            .map(|_| RAUM_ALPHABET[rng.gen_range(0..RAUM_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    /// Prueft Laenge und Alphabet einer Raum-ID
    pub fn parse(wert: &str) -> Result<Self, RoomIdFehler> {
        let laenge = wert.chars().count();
        if laenge != RAUM_ID_LAENGE {
            return Err(RoomIdFehler::FalscheLaenge(laenge));
        }
        if let Some(c) = wert.chars().find(|c| !c.is_ascii() || !RAUM_ALPHABET.contains(&(*c as u8))) {
            return Err(RoomIdFehler::UngueltigesZeichen(c));
        }
        Ok(Self(wert.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomIdFehler;

    fn try_from(wert: String) -> Result<Self, Self::Error> {
        Self::parse(&wert)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Eindeutige ID einer Relay-Verbindung
///
/// Ein Benutzername kann mehrfach verbunden sein, deshalb wird die
/// Mitgliedschaft ueber die Verbindung und nicht ueber den Namen gefuehrt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generierte_raum_id_ist_gueltig() {
        for _ in 0..100 {
            let id = RoomId::generieren();
            assert_eq!(id.as_str().len(), RAUM_ID_LAENGE);
            assert_eq!(RoomId::parse(id.as_str()), Ok(id));
        }
    }

    #[test]
    fn raum_ids_sind_eindeutig() {
        let a = RoomId::generieren();
        let b = RoomId::generieren();
        assert_ne!(a, b, "Zwei neue Raum-IDs muessen verschieden sein");
    }

    #[test]
    fn parse_lehnt_falsches_format_ab() {
        assert_eq!(RoomId::parse("kurz"), Err(RoomIdFehler::FalscheLaenge(4)));
        assert_eq!(
            RoomId::parse("abc/efghij"),
            Err(RoomIdFehler::UngueltigesZeichen('/'))
        );
        assert!(RoomId::parse("äbcdefghij").is_err());
    }

    #[test]
    fn raum_id_serde_prueft_format() {
        let id = RoomId::parse("V1StGXR8_Z").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"V1StGXR8_Z\"");
        let zurueck: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, id);

        assert!(serde_json::from_str::<RoomId>("\"../../etc\"").is_err());
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId(Uuid::nil());
        assert!(id.to_string().starts_with("conn:"));
    }
}
