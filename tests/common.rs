// tests/common.rs
//! Shared test utilities — logging setup and a reusable key pair

use std::path::Path;
use std::sync::OnceLock;

use oops::keys::generate_key_pair;
use oops::KeyStore;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Small modulus keeps key generation cheap; single-block limit is 117 bytes
#[allow(dead_code)]
pub const TEST_BITS: usize = 1024;

/// Initialize test-friendly logging
/// Call once at the start of any test that needs logs
#[allow(dead_code)]
pub fn setup() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer()) // works in `cargo test`
        .with(EnvFilter::from_default_env()) // respects RUST_LOG=
        .try_init()
        .ok(); // idempotent — safe to call multiple times
}

/// One key pair per test binary; generating RSA keys is the slow part
#[allow(dead_code)]
pub fn test_key_pair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(|| generate_key_pair(TEST_BITS).expect("generate test key pair"))
}

/// A key store inside `dir` already holding the shared test pair
#[allow(dead_code)]
pub fn key_store_in(dir: &Path) -> KeyStore {
    let store = KeyStore::new(dir.join("private.pem"), dir.join("public.pem"));
    let (private, public) = test_key_pair();
    store.persist(private, public).expect("persist test key pair");
    store
}
