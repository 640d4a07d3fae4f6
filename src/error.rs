// src/error.rs
//! Public error type for the entire crate

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read key file {path}: {source}")]
    KeyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key file: {0}")]
    KeyFormat(String),

    #[error("RSA operation failed: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("Crypto operation failed: {0}")]
    Crypto(String),

    #[error("plaintext is {len} bytes, single-block limit is {max} bytes")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("failed to replace target file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("{} does not carry the encrypted suffix", .0.display())]
    MissingSuffix(PathBuf),

    #[error("unknown mode {0:?}, expected \"encrypt\" or \"decrypt\"")]
    UnknownMode(String),

    #[error("worker task failed: {0}")]
    Task(String),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse classification used in task logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    KeyMissing,
    KeyFormat,
    Transform,
    Io,
    Config,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::KeyUnreadable { .. } => ErrorKind::KeyMissing,
            CoreError::KeyFormat(_) => ErrorKind::KeyFormat,
            CoreError::Rsa(_) | CoreError::Crypto(_) | CoreError::PlaintextTooLarge { .. } => {
                ErrorKind::Transform
            }
            CoreError::Io(_)
            | CoreError::Persist(_)
            | CoreError::MissingSuffix(_)
            | CoreError::Task(_)
            | CoreError::Walk(_) => ErrorKind::Io,
            CoreError::UnknownMode(_) | CoreError::Config(_) | CoreError::Toml(_) => {
                ErrorKind::Config
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
