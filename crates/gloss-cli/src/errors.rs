//! CLI error types for structured error handling.
//!
//! Core errors are mapped to exit codes here; CLI-only failures use
//! [`CliError`].

use std::fmt;

use gloss_core::GlossError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (record, quote, note)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, .. } => write!(f, "{}", message),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            CliError::NotFound { hint, .. } => Some(hint),
            CliError::InvalidInput(_) => None,
        }
    }
}

/// Exit code for any error reaching `main`.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    match err.downcast_ref::<GlossError>() {
        Some(GlossError::DecryptionUnavailable) => exit_codes::LOCKED,
        Some(GlossError::AuthenticationFailure) => exit_codes::AUTH_FAILED,
        Some(GlossError::AnchorUnresolvable(_)) => exit_codes::NOT_FOUND,
        Some(GlossError::StorageUnavailable(_)) => exit_codes::STORAGE,
        Some(GlossError::Validation(_)) | Some(GlossError::InvalidInput(_)) => {
            exit_codes::INVALID_INPUT
        }
        Some(GlossError::Crypto(_)) | None => exit_codes::FAILURE,
    }
}

/// A follow-up suggestion for an error, if one applies.
pub fn error_hint(err: &anyhow::Error) -> Option<String> {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.hint().map(str::to_string);
    }
    match err.downcast_ref::<GlossError>()? {
        GlossError::DecryptionUnavailable => Some(
            "Set GLOSS_PASSPHRASE, enable the keychain, or run interactively to be prompted."
                .to_string(),
        ),
        GlossError::AuthenticationFailure => Some(
            "The passphrase does not match the one used to write this record.".to_string(),
        ),
        GlossError::AnchorUnresolvable(_) => {
            Some("The document changed too much for this anchor to apply.".to_string())
        }
        _ => None,
    }
}
