//! Claim-Typen der beiden Token-Arten
//!
//! Beide Claims haben ein Pflichtfeld, das der jeweils andere nicht besitzt.
//! Ein Identitaets-Token laesst sich deshalb nie als Raum-Token pruefen und
//! umgekehrt.

use kammer_core::RoomId;
use serde::{Deserialize, Serialize};

/// Identitaet eines Teilnehmers (reine Behauptung, keine Passwortpruefung)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Benutzername
    pub sub: String,
}

impl IdentityClaim {
    pub fn neu(subject: impl Into<String>) -> Self {
        Self { sub: subject.into() }
    }
}

/// Bindung an einen Raum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBindingClaim {
    pub room_id: RoomId,
}

impl RoomBindingClaim {
    pub fn neu(room_id: RoomId) -> Self {
        Self { room_id }
    }
}
