// src/config/app.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::defaults::*;
use crate::consts::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
use crate::enums::Scheme;
use crate::error::Result;
use crate::session::SessionSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keys: KeyConfig,
    pub session: SessionConfig,
    pub paths: Paths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
    pub bits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum files in flight; 0 means unbounded
    pub concurrency: usize,
    pub dry_run_max_delay_ms: u64,
    pub scheme: Scheme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub root: PathBuf,
}

impl Default for KeyConfig {
    fn default() -> Self {
        default_keys()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        default_session()
    }
}

impl Default for Paths {
    fn default() -> Self {
        default_paths()
    }
}

impl Config {
    /// Load from `$OOPS_CONFIG` (or `oops.toml`); falls back to defaults if missing
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            warn!(path = %config_path, "config file not found, using built-in defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            concurrency: (self.concurrency > 0).then_some(self.concurrency),
            dry_run_max_delay: Duration::from_millis(self.dry_run_max_delay_ms),
            scheme: self.scheme,
        }
    }
}
