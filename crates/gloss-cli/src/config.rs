use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gloss_core::AnchorPolicy;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossConfig {
    pub store: StoreSection,
    pub security: SecuritySection,
    pub anchor: AnchorSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    /// Look the passphrase up in the OS keychain
    pub keychain: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSection {
    pub policy: AnchorPolicy,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("gloss.db"))
}

/// Read the config at `path`; a missing file means defaults.
pub fn load_config(path: &Path) -> anyhow::Result<GlossConfig> {
    if !path.exists() {
        return Ok(GlossConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<GlossConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Expand a leading `~/` against `HOME`.
pub fn expand_home(path: &str) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("gloss"));
        }
    }
    Ok(home_dir()?.join(".config").join("gloss"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("gloss"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("gloss"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
