//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use serde::{Deserialize, Serialize};

/// Verschluesselte Chat-Nachricht, so wie sie direkt zwischen den Peers
/// uebertragen wird: `{"iv": "<base64>", "data": "<base64>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// 12 Bytes Nonce, Base64
    pub iv: String,
    /// Ciphertext inkl. 16 Bytes Auth-Tag (angehaengt), Base64
    pub data: String,
}

impl EncryptedPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format() {
        let payload = EncryptedPayload {
            iv: "AAAAAAAAAAAAAAAA".into(),
            data: "ZGF0YQ==".into(),
        };
        let json = payload.to_json().unwrap();
        assert_eq!(json, r#"{"iv":"AAAAAAAAAAAAAAAA","data":"ZGF0YQ=="}"#);
        assert_eq!(EncryptedPayload::from_json(&json).unwrap(), payload);
    }
}
