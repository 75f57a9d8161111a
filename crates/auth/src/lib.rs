//! kammer-auth – Token-Codec
//!
//! Dieses Crate implementiert:
//! - Signieren und Pruefen kurzlebiger Bearer-Tokens (HS256)
//! - Identitaets-Claim (`sub` = Benutzername)
//! - Raumbindungs-Claim (`roomId`)
//!
//! Der Codec ist zustandslos: alles haengt nur am gemeinsamen Geheimnis.

pub mod claims;
pub mod error;
pub mod token;

// Bequeme Re-Exporte
pub use claims::{IdentityClaim, RoomBindingClaim};
pub use error::{AuthError, AuthResult};
pub use token::{token_ttl, TokenCodec, TOKEN_TTL_SEKUNDEN};
