//! Envelope encryption of persisted records.
//!
//! Every record written to the store is wrapped in an [`Envelope`]. With a
//! passphrase key present the record is sealed with AES-256-GCM under a
//! fresh 96-bit IV; without one it is stored as a self-tagged plaintext
//! envelope. Wire form:
//!
//! ```text
//! { "kind": "plain",  "value": <json> }
//! { "kind": "cipher", "iv": "<base64, 12 bytes>", "data": "<base64 ciphertext + tag>" }
//! ```

use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{DerivedKey, KeyManager};
use crate::error::{GlossError, Result};

/// Size of the AES-GCM initialization vector in bytes.
pub const IV_LENGTH: usize = 12;

/// A persisted record, either in the clear or sealed under the passphrase key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Envelope {
    /// Stored without encryption; readable by anyone with the medium.
    #[serde(rename = "plain")]
    Plaintext { value: serde_json::Value },

    /// AES-256-GCM ciphertext; `data` includes the authentication tag.
    #[serde(rename = "cipher")]
    Ciphertext {
        #[serde(with = "b64_iv")]
        iv: [u8; IV_LENGTH],
        #[serde(with = "b64_bytes")]
        data: Vec<u8>,
    },
}

impl Envelope {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Envelope::Ciphertext { .. })
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| GlossError::Validation(format!("Malformed envelope: {}", e)))
    }
}

/// Seal `record` under `key`, or wrap it as plaintext when there is no key.
pub fn encode_with_key(key: Option<&DerivedKey>, record: &serde_json::Value) -> Result<Envelope> {
    let Some(key) = key else {
        return Ok(Envelope::Plaintext {
            value: record.clone(),
        });
    };

    let plaintext = Zeroizing::new(serde_json::to_vec(record)?);
    let iv = generate_iv()?;
    let data = cipher_for(key)
        .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
        .map_err(|e| GlossError::Crypto(format!("Record encryption failed: {}", e)))?;

    Ok(Envelope::Ciphertext { iv, data })
}

/// Open `envelope` with `key`.
///
/// # Errors
///
/// - `GlossError::DecryptionUnavailable` for ciphertext when `key` is `None`
/// - `GlossError::AuthenticationFailure` when the tag does not verify (wrong
///   key or tampered data); no partial plaintext is ever returned
pub fn decode_with_key(key: Option<&DerivedKey>, envelope: &Envelope) -> Result<serde_json::Value> {
    match envelope {
        Envelope::Plaintext { value } => Ok(value.clone()),
        Envelope::Ciphertext { iv, data } => {
            let key = key.ok_or(GlossError::DecryptionUnavailable)?;
            let plaintext = Zeroizing::new(
                cipher_for(key)
                    .decrypt(Nonce::from_slice(iv), data.as_slice())
                    .map_err(|_| GlossError::AuthenticationFailure)?,
            );
            serde_json::from_slice(&plaintext).map_err(|e| {
                GlossError::Validation(format!("Decrypted record is not valid JSON: {}", e))
            })
        }
    }
}

/// Envelope codec bound to the shared [`KeyManager`].
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    keys: Arc<KeyManager>,
}

impl EnvelopeCodec {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    /// Encode under whatever key is current at the time of the call.
    pub fn encode(&self, record: &serde_json::Value) -> Result<Envelope> {
        encode_with_key(self.keys.current().as_deref(), record)
    }

    /// Decode under whatever key is current at the time of the call.
    pub fn decode(&self, envelope: &Envelope) -> Result<serde_json::Value> {
        decode_with_key(self.keys.current().as_deref(), envelope)
    }
}

fn cipher_for(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

fn generate_iv() -> Result<[u8; IV_LENGTH]> {
    let mut iv = [0u8; IV_LENGTH];
    getrandom::getrandom(&mut iv)
        .map_err(|e| GlossError::Crypto(format!("Failed to generate IV: {}", e)))?;
    Ok(iv)
}

mod b64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

mod b64_iv {
    use serde::{Deserializer, Serializer};

    use super::IV_LENGTH;

    pub fn serialize<S: Serializer>(iv: &[u8; IV_LENGTH], serializer: S) -> Result<S::Ok, S::Error> {
        super::b64_bytes::serialize(iv, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; IV_LENGTH], D::Error> {
        let bytes = super::b64_bytes::deserialize(deserializer)?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            serde::de::Error::custom(format!(
                "IV must be {} bytes (got {})",
                IV_LENGTH,
                bytes.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_key, KeyDerivationParams};
    use serde_json::json;

    fn key(passphrase: &str) -> DerivedKey {
        let params =
            KeyDerivationParams::new(b"salt-1234567890123456".to_vec(), 100_000).unwrap();
        derive_key(passphrase, &params).unwrap()
    }

    #[test]
    fn test_round_trip_with_key() {
        let k = key("correctpass");
        let record = json!({"a": 1, "nested": {"list": [1, 2, 3]}});

        let envelope = encode_with_key(Some(&k), &record).unwrap();
        assert!(envelope.is_encrypted());
        assert_eq!(decode_with_key(Some(&k), &envelope).unwrap(), record);
    }

    #[test]
    fn test_no_key_yields_plaintext() {
        let record = json!({"a": 1});
        let envelope = encode_with_key(None, &record).unwrap();
        assert_eq!(
            envelope,
            Envelope::Plaintext {
                value: record.clone()
            }
        );

        // Plaintext decodes regardless of key state.
        assert_eq!(decode_with_key(None, &envelope).unwrap(), record);
        assert_eq!(
            decode_with_key(Some(&key("anything")), &envelope).unwrap(),
            record
        );
    }

    #[test]
    fn test_wrong_key_is_authentication_failure() {
        let envelope = encode_with_key(Some(&key("key-one-pass")), &json!({"a": 1})).unwrap();
        let result = decode_with_key(Some(&key("key-two-pass")), &envelope);
        assert!(matches!(result, Err(GlossError::AuthenticationFailure)));
    }

    #[test]
    fn test_missing_key_is_decryption_unavailable() {
        let envelope = encode_with_key(Some(&key("correctpass")), &json!({"a": 1})).unwrap();
        let result = decode_with_key(None, &envelope);
        assert!(matches!(result, Err(GlossError::DecryptionUnavailable)));
    }

    #[test]
    fn test_tampered_ciphertext_is_authentication_failure() {
        let k = key("correctpass");
        let envelope = encode_with_key(Some(&k), &json!({"a": 1})).unwrap();
        let Envelope::Ciphertext { iv, mut data } = envelope else {
            panic!("expected ciphertext");
        };
        data[0] ^= 0x01;
        let tampered = Envelope::Ciphertext { iv, data };
        assert!(matches!(
            decode_with_key(Some(&k), &tampered),
            Err(GlossError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let k = key("correctpass");
        let record = json!({"a": 1});
        let first = encode_with_key(Some(&k), &record).unwrap();
        let second = encode_with_key(Some(&k), &record).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wire_format_tags() {
        let plain = Envelope::Plaintext { value: json!({"a": 1}) };
        let wire: serde_json::Value = serde_json::from_str(&plain.to_json().unwrap()).unwrap();
        assert_eq!(wire["kind"], "plain");
        assert_eq!(wire["value"], json!({"a": 1}));

        let sealed = encode_with_key(Some(&key("correctpass")), &json!({"a": 1})).unwrap();
        let wire: serde_json::Value = serde_json::from_str(&sealed.to_json().unwrap()).unwrap();
        assert_eq!(wire["kind"], "cipher");
        assert!(wire["iv"].is_string());
        assert!(wire["data"].is_string());
        assert!(wire.get("value").is_none());
    }

    #[test]
    fn test_ciphertext_does_not_contain_plaintext() {
        let sealed = encode_with_key(
            Some(&key("correctpass")),
            &json!({"marker": "PLAINTEXT_MARKER_123"}),
        )
        .unwrap();
        assert!(!sealed.to_json().unwrap().contains("PLAINTEXT_MARKER_123"));
    }

    #[test]
    fn test_plaintext_is_never_read_as_cipher() {
        // A plaintext record whose value looks like a ciphertext stays plaintext.
        let raw = r#"{"kind":"plain","value":{"iv":"AAAAAAAAAAAAAAAA","data":"AAAA"}}"#;
        let envelope = Envelope::from_json(raw).unwrap();
        assert!(!envelope.is_encrypted());
    }

    #[test]
    fn test_bad_iv_length_rejected() {
        let raw = r#"{"kind":"cipher","iv":"AAAA","data":"AAAA"}"#;
        assert!(matches!(
            Envelope::from_json(raw),
            Err(GlossError::Validation(_))
        ));
    }

    #[test]
    fn test_untagged_payload_rejected() {
        assert!(Envelope::from_json(r#"{"value": 1}"#).is_err());
    }

    #[test]
    fn test_codec_follows_current_key() {
        use secrecy::SecretString;

        let params = KeyDerivationParams::new(b"salt-1234567890123456".to_vec(), 100_000).unwrap();
        let codec = EnvelopeCodec::new(Arc::new(KeyManager::new(params)));
        let record = json!({"a": 1});

        assert!(!codec.encode(&record).unwrap().is_encrypted());

        codec
            .keys()
            .set_passphrase(&SecretString::from("correctpass"))
            .unwrap();
        let sealed = codec.encode(&record).unwrap();
        assert!(sealed.is_encrypted());
        assert_eq!(codec.decode(&sealed).unwrap(), record);

        codec.keys().clear();
        assert!(matches!(
            codec.decode(&sealed),
            Err(GlossError::DecryptionUnavailable)
        ));
    }
}
