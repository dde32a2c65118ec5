//! Holder for the single active passphrase-derived key.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use super::key::{derive_key, DerivedKey, KeyDerivationParams};
use crate::error::Result;

/// Owns the current key and swaps it atomically when the passphrase changes.
///
/// Readers take an `Arc` snapshot with [`KeyManager::current`]; an operation
/// that captured a snapshot keeps using it even if the passphrase is replaced
/// while it runs. The key is only ever held in memory.
pub struct KeyManager {
    params: KeyDerivationParams,
    current: RwLock<Option<Arc<DerivedKey>>>,
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new(KeyDerivationParams::default())
    }
}

impl KeyManager {
    /// Create a manager with no key set.
    pub fn new(params: KeyDerivationParams) -> Self {
        Self {
            params,
            current: RwLock::new(None),
        }
    }

    /// Set or clear the passphrase.
    ///
    /// An empty passphrase clears the key. Otherwise the key is derived
    /// before the swap, so readers never wait on the derivation.
    /// Returns whether a key is present afterwards.
    pub fn set_passphrase(&self, passphrase: &SecretString) -> Result<bool> {
        let exposed = passphrase.expose_secret();
        if exposed.is_empty() {
            self.clear();
            return Ok(false);
        }

        let key = derive_key(exposed, &self.params)?;
        self.swap(Some(Arc::new(key)));
        tracing::debug!("passphrase key installed");
        Ok(true)
    }

    /// Remove the current key.
    pub fn clear(&self) {
        if self.swap(None).is_some() {
            tracing::debug!("passphrase key cleared");
        }
    }

    /// Snapshot of the key current at the time of the call.
    pub fn current(&self) -> Option<Arc<DerivedKey>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_key(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn swap(&self, next: Option<Arc<DerivedKey>>) -> Option<Arc<DerivedKey>> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("iterations", &self.params.iterations())
            .field("has_key", &self.has_key())
            .finish()
    }
}
