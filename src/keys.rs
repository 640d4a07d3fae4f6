// src/keys.rs
//! RSA key pair lifecycle — generate-if-absent, persist, reload, validate
//!
//! Both halves live in their own armored file:
//! - private: `RSA PRIVATE KEY` wrapping PKCS#1 `RSAPrivateKey` DER
//! - public: `RSA PUBLIC KEY` wrapping X.509 `SubjectPublicKeyInfo` DER
//!
//! The two files are written and loaded independently; nothing checks that
//! a loaded public key belongs to a loaded private key.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::spki::SubjectPublicKeyInfoRef;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::armor;
use crate::config::KeyConfig;
use crate::consts::{MIN_KEY_BITS, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use crate::error::{CoreError, Result};

/// Outcome of [`KeyStore::generate_if_absent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneration {
    /// A fresh pair was generated and written
    Generated { bits: usize },
    /// Both files were already present and left alone
    Existing,
}

/// Storage locations of one key pair
#[derive(Debug, Clone)]
pub struct KeyStore {
    private_path: PathBuf,
    public_path: PathBuf,
}

impl KeyStore {
    pub fn new(private_path: impl Into<PathBuf>, public_path: impl Into<PathBuf>) -> Self {
        Self {
            private_path: private_path.into(),
            public_path: public_path.into(),
        }
    }

    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(&config.private_key, &config.public_key)
    }

    pub fn private_path(&self) -> &Path {
        &self.private_path
    }

    pub fn public_path(&self) -> &Path {
        &self.public_path
    }

    /// True only when both halves are on disk
    pub fn keys_exist(&self) -> bool {
        self.private_path.exists() && self.public_path.exists()
    }

    /// Generate and persist a new pair unless both files already exist.
    ///
    /// An existing pair is reused as-is, even when its modulus size differs
    /// from `bits`; the mismatch is only logged.
    pub fn generate_if_absent(&self, bits: usize) -> Result<KeyGeneration> {
        if self.keys_exist() {
            info!(
                private = %self.private_path.display(),
                public = %self.public_path.display(),
                "keys already exist, continuing"
            );
            match load_public_key(&self.public_path) {
                Ok(public) if public.size() * 8 != bits => warn!(
                    existing_bits = public.size() * 8,
                    requested_bits = bits,
                    "reusing key pair with a different modulus size"
                ),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "existing public key could not be inspected"),
            }
            return Ok(KeyGeneration::Existing);
        }

        let (private, public) = generate_key_pair(bits)?;
        self.persist(&private, &public)?;
        match fingerprint(&public) {
            Ok(fingerprint) => info!(bits, %fingerprint, "generated new key pair"),
            Err(e) => warn!(bits, error = %e, "generated new key pair, fingerprint unavailable"),
        }
        Ok(KeyGeneration::Generated { bits })
    }

    pub fn persist(&self, private: &RsaPrivateKey, public: &RsaPublicKey) -> Result<()> {
        persist_key_pair(&self.private_path, private, &self.public_path, public)
    }

    pub fn load_public(&self) -> Result<RsaPublicKey> {
        load_public_key(&self.public_path)
    }

    pub fn load_private(&self) -> Result<RsaPrivateKey> {
        load_private_key(&self.private_path)
    }
}

/// Generate a new RSA key pair from the OS random source
pub fn generate_key_pair(bits: usize) -> Result<(RsaPrivateKey, RsaPublicKey)> {
    if bits < MIN_KEY_BITS {
        return Err(CoreError::Config(format!(
            "refusing to generate a {bits}-bit key (minimum {MIN_KEY_BITS})"
        )));
    }
    debug!(bits, "generating RSA key pair");
    let private = RsaPrivateKey::new(&mut OsRng, bits)?;
    let public = RsaPublicKey::from(&private);
    Ok((private, public))
}

/// Write each half as one armored block to its own file.
///
/// The private half goes first. A failure on the public half leaves the
/// private file in place.
pub fn persist_key_pair(
    private_path: &Path,
    private: &RsaPrivateKey,
    public_path: &Path,
    public: &RsaPublicKey,
) -> Result<()> {
    save_private_key(private_path, private)?;
    save_public_key(public_path, public)
}

pub fn save_private_key(path: &Path, key: &RsaPrivateKey) -> Result<()> {
    let der = key
        .to_pkcs1_der()
        .map_err(|e| CoreError::KeyFormat(format!("failed to encode private key: {e}")))?;
    let armored = Zeroizing::new(armor::encode(PRIVATE_KEY_LABEL, der.as_bytes())?);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(armored.as_bytes())?;
    file.flush()?;
    Ok(())
}

pub fn save_public_key(path: &Path, key: &RsaPublicKey) -> Result<()> {
    let der = key
        .to_public_key_der()
        .map_err(|e| CoreError::KeyFormat(format!("failed to encode public key: {e}")))?;
    let armored = armor::encode(PUBLIC_KEY_LABEL, der.as_bytes())?;

    let mut file = fs::File::create(path)?;
    file.write_all(armored.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Load an RSA public key from a strictly armored SubjectPublicKeyInfo file
pub fn load_public_key(path: &Path) -> Result<RsaPublicKey> {
    let raw = read_key_file(path)?;
    let block = armor::decode(&raw)?;

    let spki = SubjectPublicKeyInfoRef::try_from(block.payload.as_slice())
        .map_err(|e| CoreError::KeyFormat(format!("failed to parse public key: {e}")))?;
    if spki.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
        return Err(CoreError::KeyFormat(format!(
            "not an RSA public key (algorithm {})",
            spki.algorithm.oid
        )));
    }

    RsaPublicKey::from_public_key_der(&block.payload)
        .map_err(|e| CoreError::KeyFormat(format!("failed to parse public key: {e}")))
}

/// Load an RSA private key from a strictly armored PKCS#1 file
pub fn load_private_key(path: &Path) -> Result<RsaPrivateKey> {
    let raw = Zeroizing::new(read_key_file(path)?);
    let block = armor::decode(&raw)?;
    let payload = Zeroizing::new(block.payload);

    if block.label != PRIVATE_KEY_LABEL {
        return Err(CoreError::KeyFormat(format!(
            "unexpected key type: {}",
            block.label
        )));
    }

    RsaPrivateKey::from_pkcs1_der(&payload)
        .map_err(|e| CoreError::KeyFormat(format!("failed to parse private key: {e}")))
}

/// Lowercase hex SHA-256 of the public key's SubjectPublicKeyInfo DER
pub fn fingerprint(key: &RsaPublicKey) -> Result<String> {
    let der = key
        .to_public_key_der()
        .map_err(|e| CoreError::KeyFormat(format!("failed to encode public key: {e}")))?;
    Ok(hex::encode(Sha256::digest(der.as_bytes())))
}

fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| CoreError::KeyUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
