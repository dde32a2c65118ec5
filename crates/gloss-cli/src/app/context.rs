//! Application context for the Gloss CLI.
//!
//! Combines CLI arguments with the lazily-loaded config file and the
//! resolved UI settings.

use std::cell::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use gloss_core::storage::SqliteMedium;
use gloss_core::{Gloss, KeyDerivationParams};

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_path, expand_home, load_config, GlossConfig};
use crate::constants::env_vars;
use crate::ui::{with_spinner, UiContext};

use super::passphrase::{resolve_passphrase, PassphraseSource};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    ui: UiContext,
    config: OnceCell<GlossConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            ui: UiContext::from_env(false, cli.no_color),
            config: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// UI context, with JSON output forced when `json` is set.
    pub fn ui(&self, json: bool) -> UiContext {
        self.ui.with_json(json)
    }

    /// Config file location: `GLOSS_CONFIG`, else the XDG default.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match std::env::var(env_vars::CONFIG) {
            Ok(value) if !value.trim().is_empty() => expand_home(&value),
            _ => default_config_path(),
        }
    }

    /// The config file, loaded on first use.
    pub fn config(&self) -> anyhow::Result<&GlossConfig> {
        if let Some(config) = self.config.get() {
            return Ok(config);
        }
        let loaded = load_config(&self.config_path()?)?;
        Ok(self.config.get_or_init(|| loaded))
    }

    /// Store location: `--store`, then the config file, then the XDG default.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.cli.store {
            return expand_home(path);
        }
        if let Some(path) = &self.config()?.store.path {
            return expand_home(path);
        }
        default_store_path()
    }

    /// Open the store and install whatever passphrase can be found.
    pub async fn open(&self) -> anyhow::Result<Gloss> {
        let store_path = self.store_path()?;
        let config = self.config()?;
        let medium = SqliteMedium::open(&store_path)?;
        let gloss = Gloss::new(
            Arc::new(medium),
            KeyDerivationParams::default(),
            config.anchor.policy,
        );

        let (passphrase, source) = resolve_passphrase(self.cli, config, &store_path)?;
        if let Some(passphrase) = passphrase {
            with_spinner(&self.ui, "Deriving key", || gloss.set_passphrase(&passphrase))?;
        }
        tracing::debug!(
            store = %store_path.display(),
            source = source.as_str(),
            "store opened"
        );
        Ok(gloss)
    }
}
