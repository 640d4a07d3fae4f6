// src/crypto/single_block.rs
//! RSA PKCS#1 v1.5 applied to the whole content as one block
//!
//! The ciphertext is exactly one modulus long. Plaintext is capped at
//! `modulus_bytes - 11`; anything larger is refused before touching the key.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

use crate::consts::PKCS1_V15_OVERHEAD;
use crate::error::{CoreError, Result};

/// Largest plaintext this key can encrypt in one block
pub fn max_plaintext_len(key: &RsaPublicKey) -> usize {
    key.size().saturating_sub(PKCS1_V15_OVERHEAD)
}

/// Encrypt plaintext in memory → one PKCS#1 v1.5 block
pub fn encrypt_to_vec(plaintext: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>> {
    let max = max_plaintext_len(key);
    if plaintext.len() > max {
        return Err(CoreError::PlaintextTooLarge {
            len: plaintext.len(),
            max,
        });
    }
    Ok(key.encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)?)
}

/// Decrypt one PKCS#1 v1.5 block → plaintext
pub fn decrypt_to_vec(ciphertext: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>> {
    Ok(key.decrypt(Pkcs1v15Encrypt, ciphertext)?)
}
