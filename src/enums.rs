// src/enums.rs
//! Public enum types used throughout the crate
//!
//! User-visible choices: which direction to transform files in, and
//! which envelope scheme new ciphertext is written with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Direction of a processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encrypt" => Ok(Mode::Encrypt),
            "decrypt" => Ok(Mode::Decrypt),
            _ => Err(CoreError::UnknownMode(s.to_owned())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        })
    }
}

/// Envelope used when encrypting
///
/// Decryption never consults this: the scheme is detected from the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    /// RSA PKCS#1 v1.5 over the whole file; limited to one modulus-sized block
    SingleBlock,
    /// RSA-OAEP wrapped per-file key + chunked XChaCha20-Poly1305
    #[default]
    Hybrid,
}

impl FromStr for Scheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-block" | "single_block" => Ok(Scheme::SingleBlock),
            "hybrid" => Ok(Scheme::Hybrid),
            other => Err(CoreError::Config(format!("unknown scheme {other:?}"))),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::SingleBlock => "single-block",
            Scheme::Hybrid => "hybrid",
        })
    }
}
