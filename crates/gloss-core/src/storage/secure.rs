//! Secure object store: named records persisted as envelopes.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::medium::StorageMedium;
use crate::crypto::KeyManager;
use crate::envelope::{decode_with_key, encode_with_key, Envelope};
use crate::error::{GlossError, Result};

/// Outcome of reading a record, keeping "locked" apart from "missing".
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Nothing stored under the name.
    Missing,
    /// Ciphertext is stored but no key is set.
    Locked,
    /// Ciphertext is stored but does not verify under the current key,
    /// usually because the passphrase changed since it was written.
    Mismatched,
    /// The decoded record.
    Found(serde_json::Value),
}

impl Lookup {
    /// Collapse to the "nothing readable" view most callers want.
    pub fn into_value(self) -> Option<serde_json::Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing | Lookup::Locked | Lookup::Mismatched => None,
        }
    }
}

/// Keyed store of records, each held as an [`Envelope`] on the medium.
///
/// Every operation captures the key current at invocation and uses it for
/// its whole duration. There is no re-encryption: records sealed under an
/// old passphrase read as locked or fail authentication under a new one.
#[derive(Clone)]
pub struct SecureStore {
    medium: Arc<dyn StorageMedium>,
    keys: Arc<KeyManager>,
}

impl SecureStore {
    pub fn new(medium: Arc<dyn StorageMedium>, keys: Arc<KeyManager>) -> Self {
        Self { medium, keys }
    }

    pub fn keys(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    /// Read and decode the record stored under `name`.
    ///
    /// # Errors
    ///
    /// Ciphertext that fails authentication under the current key is reported
    /// as [`Lookup::Mismatched`], not as an error.
    ///
    /// - `GlossError::StorageUnavailable` if the medium fails
    /// - `GlossError::Validation` if the stored envelope is malformed
    pub async fn fetch(&self, name: &str) -> Result<Lookup> {
        validate_name(name)?;
        let key = self.keys.current();

        let Some(raw) = self.medium.read(name).await? else {
            tracing::debug!(record = name, "record missing");
            return Ok(Lookup::Missing);
        };

        let envelope = Envelope::from_json(&raw)?;
        match decode_with_key(key.as_deref(), &envelope) {
            Ok(value) => {
                tracing::debug!(
                    record = name,
                    encrypted = envelope.is_encrypted(),
                    "record read"
                );
                Ok(Lookup::Found(value))
            }
            Err(GlossError::DecryptionUnavailable) => {
                tracing::debug!(record = name, "record locked");
                Ok(Lookup::Locked)
            }
            Err(GlossError::AuthenticationFailure) => {
                tracing::warn!(record = name, "record sealed under a different key");
                Ok(Lookup::Mismatched)
            }
            Err(err) => {
                tracing::warn!(record = name, error = %err, "record failed to decode");
                Err(err)
            }
        }
    }

    /// Read the record under `name`; `None` when missing, locked or sealed
    /// under a different key.
    pub async fn get_value(&self, name: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.fetch(name).await?.into_value())
    }

    /// Read the record under `name` into a typed schema.
    pub async fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get_value(name).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Encode `value` under the current key policy and replace whatever is stored under `name`.
    pub async fn set_value(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        validate_name(name)?;
        let key = self.keys.current();

        let envelope = encode_with_key(key.as_deref(), value)?;
        let raw = envelope.to_json()?;
        self.medium.write(name, &raw).await?;
        tracing::debug!(
            record = name,
            encrypted = envelope.is_encrypted(),
            bytes = raw.len(),
            "record written"
        );
        Ok(())
    }

    /// Serialize a typed record and store it under `name`.
    pub async fn set<T: Serialize + ?Sized>(&self, name: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.set_value(name, &value).await
    }

    /// Remove the record stored under `name`.
    pub async fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.medium.remove(name).await?;
        tracing::debug!(record = name, "record deleted");
        Ok(())
    }

    /// List record names starting with `prefix` without decoding them.
    pub async fn list_names(&self, prefix: &str) -> Result<Vec<String>> {
        self.medium.list(prefix).await
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GlossError::InvalidInput(
            "Record name cannot be empty".to_string(),
        ));
    }
    Ok(())
}
