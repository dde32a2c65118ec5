//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Keys are derived from the user's passphrase with a fixed,
//! application-specific salt so the same passphrase always yields the same
//! key on an installation. There is one user and one passphrase; the salt
//! only separates this application's keys from other PBKDF2 users.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{GlossError, Result};

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// Lowest iteration count accepted for derivation.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Default iteration count.
pub const DEFAULT_ITERATIONS: u32 = 310_000;

/// Default application salt.
pub const DEFAULT_SALT: &[u8] = b"gloss-annotations-salt-v1";

const MIN_SALT_LENGTH: usize = 16;

/// Parameters for passphrase key derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDerivationParams {
    salt: Vec<u8>,
    iterations: u32,
}

impl KeyDerivationParams {
    /// Create parameters with a custom salt and iteration count.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::InvalidInput` if the salt is shorter than 16 bytes
    /// or the iteration count is below [`MIN_ITERATIONS`].
    pub fn new(salt: impl Into<Vec<u8>>, iterations: u32) -> Result<Self> {
        let salt = salt.into();
        if salt.len() < MIN_SALT_LENGTH {
            return Err(GlossError::InvalidInput(format!(
                "Salt must be at least {} bytes",
                MIN_SALT_LENGTH
            )));
        }
        if iterations < MIN_ITERATIONS {
            return Err(GlossError::InvalidInput(format!(
                "Iteration count must be at least {}",
                MIN_ITERATIONS
            )));
        }
        Ok(Self { salt, iterations })
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_vec(),
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// A symmetric key derived from a passphrase.
///
/// Key material is zeroized when dropped and never appears in `Debug` output.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit key from a passphrase.
///
/// # Arguments
///
/// * `passphrase` - The passphrase to derive from (must not be empty)
/// * `params` - Salt and iteration count
///
/// # Security
///
/// - Same passphrase + params always produces the same key (deterministic)
/// - Cost grows linearly with the iteration count
///
/// # Examples
///
/// ```
/// use gloss_core::crypto::{derive_key, KeyDerivationParams};
///
/// let params = KeyDerivationParams::new(b"example-salt-0123456".to_vec(), 100_000).unwrap();
/// let key = derive_key("my-passphrase", &params).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(passphrase: &str, params: &KeyDerivationParams) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(GlossError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(
        passphrase.as_bytes(),
        &params.salt,
        params.iterations,
        &mut key_bytes,
    );

    Ok(DerivedKey::from_bytes(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KeyDerivationParams {
        KeyDerivationParams::new(b"salt-1234567890123456".to_vec(), MIN_ITERATIONS).unwrap()
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let params = fast_params();
        let key1 = derive_key("test-passphrase", &params).unwrap();
        let key2 = derive_key("test-passphrase", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let a = fast_params();
        let b = KeyDerivationParams::new(b"salt-6543210987654321".to_vec(), MIN_ITERATIONS)
            .unwrap();
        let key1 = derive_key("test-passphrase", &a).unwrap();
        let key2 = derive_key("test-passphrase", &b).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let params = fast_params();
        let key1 = derive_key("passphrase-one", &params).unwrap();
        let key2 = derive_key("passphrase-two", &params).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let result = derive_key("", &fast_params());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Passphrase cannot be empty"));
    }

    #[test]
    fn test_short_salt_rejected() {
        let result = KeyDerivationParams::new(b"short".to_vec(), MIN_ITERATIONS);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Salt must be at least 16 bytes"));
    }

    #[test]
    fn test_low_iteration_count_rejected() {
        let result = KeyDerivationParams::new(b"salt-1234567890123456".to_vec(), 1_000);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_params_meet_floor() {
        let params = KeyDerivationParams::default();
        assert!(params.iterations() >= MIN_ITERATIONS);
        assert!(params.salt().len() >= MIN_SALT_LENGTH);
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key("test-passphrase", &fast_params()).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
