//! Signieren und Pruefen von Bearer-Tokens
//!
//! Tokens sind HS256-JWTs. Die fachlichen Claims liegen flach neben
//! `iat`/`exp` (Unix-Sekunden). Beim Pruefen gibt es keine Toleranz fuer
//! Uhrenabweichung: ein abgelaufenes Token ist sofort ungueltig.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Lebensdauer beider Token-Arten: 2 Stunden
pub const TOKEN_TTL_SEKUNDEN: i64 = 2 * 60 * 60;

/// Lebensdauer beider Token-Arten als `Duration`
pub fn token_ttl() -> Duration {
    Duration::seconds(TOKEN_TTL_SEKUNDEN)
}

/// Umschlag mit Zeitstempeln um einen fachlichen Claim
#[derive(Debug, Serialize, Deserialize)]
struct Signiert<C> {
    #[serde(flatten)]
    claims: C,
    iat: i64,
    exp: i64,
}

/// Zustandsloser Token-Codec ueber einem gemeinsamen Geheimnis
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenCodec([REDACTED])")
    }
}

impl TokenCodec {
    /// Erstellt einen Codec fuer das gegebene Geheimnis
    pub fn neu(geheimnis: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(geheimnis),
            decoding: DecodingKey::from_secret(geheimnis),
            validation,
        }
    }

    /// Signiert einen Claim mit der gegebenen Lebensdauer
    ///
    /// Eine negative Lebensdauer erzeugt ein bereits abgelaufenes Token.
    pub fn signieren<C: Serialize>(&self, claims: C, ttl: Duration) -> AuthResult<String> {
        let jetzt = Utc::now();
        let umschlag = Signiert {
            claims,
            iat: jetzt.timestamp(),
            exp: (jetzt + ttl).timestamp().max(0),
        };

        encode(&Header::new(Algorithm::HS256), &umschlag, &self.encoding)
            .map_err(|e| AuthError::Signierung(e.to_string()))
    }

    /// Prueft Signatur, Struktur und Ablauf und gibt den Claim zurueck
    ///
    /// Jeder Fehler wird zu `AuthError::TokenUngueltig` zusammengefasst.
    pub fn pruefen<C: DeserializeOwned>(&self, token: &str) -> AuthResult<C> {
        decode::<Signiert<C>>(token, &self.decoding, &self.validation)
            .map(|daten| daten.claims.claims)
            .map_err(|e| {
                tracing::debug!(grund = %e, "Token-Pruefung fehlgeschlagen");
                AuthError::TokenUngueltig
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{IdentityClaim, RoomBindingClaim};
    use kammer_core::RoomId;

    fn codec() -> TokenCodec {
        TokenCodec::neu(b"test-geheimnis")
    }

    #[test]
    fn identitaet_signieren_und_pruefen() {
        let codec = codec();
        let token = codec.signieren(IdentityClaim::neu("alice"), token_ttl()).unwrap();

        let claim: IdentityClaim = codec.pruefen(&token).unwrap();
        assert_eq!(claim.sub, "alice");
    }

    #[test]
    fn raumbindung_signieren_und_pruefen() {
        let codec = codec();
        let raum = RoomId::generieren();
        let token = codec
            .signieren(RoomBindingClaim::neu(raum.clone()), token_ttl())
            .unwrap();

        let claim: RoomBindingClaim = codec.pruefen(&token).unwrap();
        assert_eq!(claim.room_id, raum);
    }

    #[test]
    fn abgelaufenes_token_ist_ungueltig() {
        let codec = codec();
        let token = codec
            .signieren(IdentityClaim::neu("alice"), Duration::seconds(-1))
            .unwrap();

        let ergebnis = codec.pruefen::<IdentityClaim>(&token);
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[test]
    fn veraenderte_signatur_ist_ungueltig() {
        let codec = codec();
        let token = codec.signieren(IdentityClaim::neu("alice"), token_ttl()).unwrap();

        // Ein Byte der Signatur (letzter Abschnitt) veraendern
        let (kopf, signatur) = token.rsplit_once('.').unwrap();
        let mut bytes = signatur.as_bytes().to_vec();
        bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
        let manipuliert = format!("{kopf}.{}", String::from_utf8(bytes).unwrap());

        let ergebnis = codec.pruefen::<IdentityClaim>(&manipuliert);
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[test]
    fn fremdes_geheimnis_ist_ungueltig() {
        let token = TokenCodec::neu(b"anderes-geheimnis")
            .signieren(IdentityClaim::neu("mallory"), token_ttl())
            .unwrap();

        assert!(matches!(
            codec().pruefen::<IdentityClaim>(&token),
            Err(AuthError::TokenUngueltig)
        ));
    }

    #[test]
    fn kaputte_struktur_ist_ungueltig() {
        let codec = codec();
        for token in ["", "abc", "a.b.c", "...."] {
            assert!(matches!(
                codec.pruefen::<IdentityClaim>(token),
                Err(AuthError::TokenUngueltig)
            ));
        }
    }

    #[test]
    fn token_arten_sind_nicht_austauschbar() {
        let codec = codec();
        let identitaet = codec.signieren(IdentityClaim::neu("alice"), token_ttl()).unwrap();
        let raum = codec
            .signieren(RoomBindingClaim::neu(RoomId::generieren()), token_ttl())
            .unwrap();

        assert!(codec.pruefen::<RoomBindingClaim>(&identitaet).is_err());
        assert!(codec.pruefen::<IdentityClaim>(&raum).is_err());
    }
}
