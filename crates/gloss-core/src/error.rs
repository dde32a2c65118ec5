//! Error types for Gloss core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer will map these
//! to user-friendly messages and exit codes.

use thiserror::Error;

/// Result type alias for Gloss operations.
pub type Result<T> = std::result::Result<T, GlossError>;

/// Core error type for Gloss operations.
#[derive(Debug, Error)]
pub enum GlossError {
    /// Ciphertext is present but no passphrase-derived key is set
    #[error("Record is encrypted and no passphrase is set")]
    DecryptionUnavailable,

    /// A key is set but the ciphertext failed its integrity check
    #[error("Authentication failed: data is corrupt or the passphrase is wrong")]
    AuthenticationFailure,

    /// An anchor no longer resolves against the live document
    #[error("Anchor unresolvable: {0}")]
    AnchorUnresolvable(String),

    /// The persistent medium failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Key derivation or encryption plumbing error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Malformed envelope or record shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GlossError {
    /// True when the caller should ask for a passphrase rather than report a failure.
    pub fn is_locked(&self) -> bool {
        matches!(self, GlossError::DecryptionUnavailable)
    }
}

impl From<std::io::Error> for GlossError {
    fn from(err: std::io::Error) -> Self {
        GlossError::StorageUnavailable(err.to_string())
    }
}

impl From<rusqlite::Error> for GlossError {
    fn from(err: rusqlite::Error) -> Self {
        GlossError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for GlossError {
    fn from(err: serde_json::Error) -> Self {
        GlossError::Validation(err.to_string())
    }
}
