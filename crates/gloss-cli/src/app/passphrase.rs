//! Passphrase resolution.
//!
//! Order: `--no-passphrase`, `GLOSS_PASSPHRASE`, the OS keychain (when
//! enabled in config), then an interactive prompt. With none of these the
//! store runs in plaintext mode.

use std::io::IsTerminal;
use std::path::Path;

use dialoguer::Password;
use secrecy::{ExposeSecret, SecretString};

use gloss_core::crypto::validate_passphrase;

use crate::cli::Cli;
use crate::config::GlossConfig;
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::security::{keychain_account, keychain_get};

/// Where the passphrase came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseSource {
    Environment,
    Keychain,
    Prompt,
    None,
}

impl PassphraseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::Keychain => "keychain",
            Self::Prompt => "prompt",
            Self::None => "none",
        }
    }
}

pub fn resolve_passphrase(
    cli: &Cli,
    config: &GlossConfig,
    store_path: &Path,
) -> anyhow::Result<(Option<SecretString>, PassphraseSource)> {
    if cli.no_passphrase {
        return Ok((None, PassphraseSource::None));
    }

    if let Some(value) = env_passphrase() {
        return Ok((Some(value), PassphraseSource::Environment));
    }

    if config.security.keychain {
        match keychain_get(&keychain_account(store_path)) {
            Ok(Some(value)) => return Ok((Some(value), PassphraseSource::Keychain)),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "keychain lookup failed"),
        }
    }

    if std::io::stdin().is_terminal() && !cli.quiet {
        let value = Password::new()
            .with_prompt("Passphrase (empty for plaintext)")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
        if !value.is_empty() {
            return Ok((Some(SecretString::from(value)), PassphraseSource::Prompt));
        }
    }

    Ok((None, PassphraseSource::None))
}

/// A new passphrase for the keychain: `GLOSS_PASSPHRASE` or a confirmed prompt.
pub fn prompt_new_passphrase() -> anyhow::Result<SecretString> {
    if let Some(value) = env_passphrase() {
        validate(&value)?;
        return Ok(value);
    }
    if !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ));
    }
    loop {
        let passphrase = Password::new()
            .with_prompt("Enter passphrase")
            .with_confirmation("Confirm passphrase", "Passphrases do not match")
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
        let passphrase = SecretString::from(passphrase);
        if let Err(err) = validate(&passphrase) {
            eprintln!("{}", err);
            continue;
        }
        return Ok(passphrase);
    }
}

fn env_passphrase() -> Option<SecretString> {
    std::env::var(env_vars::PASSPHRASE)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn validate(passphrase: &SecretString) -> anyhow::Result<()> {
    validate_passphrase(passphrase.expose_secret()).map_err(|e| {
        CliError::invalid_input(format!("Passphrase does not meet requirements: {}", e))
    })?;
    Ok(())
}
