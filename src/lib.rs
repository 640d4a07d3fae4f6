// src/lib.rs
//! oops — batch file encryption under a locally generated RSA key pair
//!
//! Features:
//! - RSA key pair generated once, stored as strict PEM-style armor
//! - Hybrid envelope (RSA-OAEP + chunked XChaCha20-Poly1305), or the
//!   single-block PKCS#1 v1.5 scheme for small files
//! - Crash-safe replacement: temp sibling, fsync, rename, then delete
//! - Concurrent sessions with bounded fan-out and atomic progress counters

pub mod aliases;
pub mod armor;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod enums;
pub mod error;
pub mod file_ops;
pub mod keys;
pub mod session;
pub mod walk;

// Re-export everything users need at the crate root
pub use config::Config;
pub use enums::{Mode, Scheme};
pub use error::{CoreError, ErrorKind, Result as CoreResult};
pub use file_ops::{decrypt_file, decrypted_path, encrypt_file, encrypted_path};
pub use keys::{KeyGeneration, KeyStore};
pub use session::{FileTask, ProcessingSession, RunReport, SessionSettings, StatusSnapshot};
pub use walk::list_files;
