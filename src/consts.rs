// src/consts.rs
//! Shared constants — naming contract, key defaults and envelope parameters

/// Suffix appended to every encrypted artifact
pub const ENCRYPTED_SUFFIX: &str = ".oops";

/// Armor label of the PKCS#1 private key block
pub const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// Armor label of the public key block (payload is SubjectPublicKeyInfo)
pub const PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

pub const DEFAULT_PRIVATE_KEY_PATH: &str = "private.pem";
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "public.pem";

/// Default modulus size for freshly generated key pairs
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Anything smaller is refused outright
pub const MIN_KEY_BITS: usize = 1024;

/// PKCS#1 v1.5 encryption padding overhead in bytes
pub const PKCS1_V15_OVERHEAD: usize = 11;

/// Header magic + version of the hybrid envelope
pub const HYBRID_MAGIC: &[u8; 5] = b"OOPS\x01";

/// Plaintext bytes per AEAD chunk in the hybrid envelope
pub const CHUNK_SIZE: usize = 64 * 1024;

/// XChaCha20-Poly1305 nonce length
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag length
pub const TAG_SIZE: usize = 16;

/// Per-file symmetric key length
pub const FILE_KEY_SIZE: usize = 32;

/// Upper bound of the simulated per-file delay in dry-run mode
pub const DEFAULT_DRY_RUN_MAX_DELAY_MS: u64 = 2_000;

/// Directory walked when nothing else is configured
pub const DEFAULT_ROOT_DIR: &str = "playground";

pub const DEFAULT_CONFIG_PATH: &str = "oops.toml";
pub const CONFIG_ENV_VAR: &str = "OOPS_CONFIG";
