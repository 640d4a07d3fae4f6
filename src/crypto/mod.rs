// src/crypto/mod.rs
//! Pure cryptographic primitives — no filesystem policy
//!
//! Everything here works on in-memory buffers or caller-supplied
//! readers/writers. `file_ops` decides where bytes land.

pub mod hybrid;
pub mod single_block;

pub use hybrid::{generate_file_key, is_hybrid_envelope};
pub use single_block::max_plaintext_len;
