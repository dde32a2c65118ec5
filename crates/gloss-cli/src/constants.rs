//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// Resource not found (record, quote, anchor target).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase or tampered record).
    pub const AUTH_FAILED: i32 = 5;

    /// The record is encrypted and no passphrase was supplied.
    pub const LOCKED: i32 = 6;

    /// The store could not be read or written.
    pub const STORAGE: i32 = 7;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const PASSPHRASE: &str = "GLOSS_PASSPHRASE";
    pub const CONFIG: &str = "GLOSS_CONFIG";
    pub const LOG: &str = "GLOSS_LOG";
}

/// Service name under which passphrases are kept in the OS keychain.
pub const KEYCHAIN_SERVICE: &str = "gloss";
