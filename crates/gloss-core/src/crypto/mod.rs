//! Cryptographic operations for Gloss.
//!
//! - **PBKDF2-HMAC-SHA256**: passphrase key derivation with a fixed
//!   application salt
//! - **AES-256-GCM**: authenticated encryption of persisted records (see
//!   [`crate::envelope`])
//!
//! ## Threat Model
//!
//! We defend against:
//! - Reading annotation records from the storage medium without the passphrase
//! - Tampering with stored ciphertext (detected, never silently accepted)
//!
//! We do NOT defend against:
//! - Code running in the same process
//! - Offline guessing of weak passphrases beyond the KDF cost

pub mod key;
pub mod manager;
pub mod passphrase;

pub use key::{derive_key, DerivedKey, KeyDerivationParams};
pub use manager::KeyManager;
pub use passphrase::validate_passphrase;
