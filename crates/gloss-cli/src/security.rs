//! OS keychain access for store passphrases.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::constants::KEYCHAIN_SERVICE;

/// Keychain account for a store: its absolute path.
pub fn keychain_account(store_path: &Path) -> String {
    std::path::absolute(store_path)
        .unwrap_or_else(|_| store_path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

pub fn keychain_get(account: &str) -> anyhow::Result<Option<SecretString>> {
    let entry = keychain_entry(account)?;
    match entry.get_password() {
        Ok(value) => Ok(Some(SecretString::from(value))),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(anyhow::anyhow!("Keychain read failed: {}", err)),
    }
}

pub fn keychain_set(account: &str, passphrase: &SecretString) -> anyhow::Result<()> {
    let entry = keychain_entry(account)?;
    entry
        .set_password(passphrase.expose_secret())
        .map_err(|e| anyhow::anyhow!("Keychain write failed: {}", e))
}

pub fn keychain_clear(account: &str) -> anyhow::Result<()> {
    let entry = keychain_entry(account)?;
    match entry.delete_password() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(anyhow::anyhow!("Keychain delete failed: {}", err)),
    }
}

fn keychain_entry(account: &str) -> anyhow::Result<keyring::Entry> {
    keyring::Entry::new(KEYCHAIN_SERVICE, account)
        .map_err(|e| anyhow::anyhow!("Keychain entry failed: {}", e))
}
