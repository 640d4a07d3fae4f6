// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{KeyConfig, Paths, SessionConfig};
use crate::consts::{
    DEFAULT_DRY_RUN_MAX_DELAY_MS, DEFAULT_KEY_BITS, DEFAULT_PRIVATE_KEY_PATH,
    DEFAULT_PUBLIC_KEY_PATH, DEFAULT_ROOT_DIR,
};
use crate::enums::Scheme;

/// One in-flight file per available core
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

pub fn default_keys() -> KeyConfig {
    KeyConfig {
        private_key: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
        public_key: PathBuf::from(DEFAULT_PUBLIC_KEY_PATH),
        bits: DEFAULT_KEY_BITS,
    }
}

pub fn default_session() -> SessionConfig {
    SessionConfig {
        concurrency: default_concurrency(),
        dry_run_max_delay_ms: DEFAULT_DRY_RUN_MAX_DELAY_MS,
        scheme: Scheme::default(),
    }
}

pub fn default_paths() -> Paths {
    Paths {
        root: PathBuf::from(DEFAULT_ROOT_DIR),
    }
}
