// src/config/mod.rs
//! Configuration system for oops
//!
//! TOML file + env override + built-in defaults. The loaded [`Config`] is
//! handed to each component explicitly; nothing reads it from a global.

pub use app::{Config, KeyConfig, Paths, SessionConfig};

mod app;
mod defaults;
