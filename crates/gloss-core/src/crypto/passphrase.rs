//! Passphrase validation.
//!
//! The core accepts any non-empty passphrase; collaborators that create a
//! new passphrase (keychain setup, first run) hold it to this minimum.

use crate::error::{GlossError, Result};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Validate a new passphrase meets minimum requirements.
///
/// # Examples
///
/// ```
/// use gloss_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("correctpass").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(GlossError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(GlossError::InvalidInput(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}
