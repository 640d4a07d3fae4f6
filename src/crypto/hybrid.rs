// src/crypto/hybrid.rs
//! Hybrid envelope: RSA-OAEP wrapped file key + chunked XChaCha20-Poly1305
//!
//! Layout (all integers big-endian):
//! ```text
//! "OOPS" 0x01
//! [u16: wrapped key length][RSA-OAEP(SHA-256) of the 32-byte file key]
//! [u32: plaintext chunk size]
//! repeated: [u8: final flag][u32: frame length][24-byte nonce][ciphertext + 16-byte tag]
//! AAD = chunk_index (u64) || final flag
//! ```
//!
//! The final flag is authenticated, so a file cut at a chunk boundary fails
//! to decrypt instead of yielding a silently shortened plaintext. The last
//! frame may be empty.

use std::io::{self, Cursor, Read, Write};

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::aliases::FileKey32;
use secure_gate::RevealSecret;
use crate::consts::{CHUNK_SIZE, FILE_KEY_SIZE, HYBRID_MAGIC, NONCE_SIZE, TAG_SIZE};
use crate::error::{CoreError, Result};

/// Largest chunk size accepted from an envelope header
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

const FLAG_MORE: u8 = 0;
const FLAG_FINAL: u8 = 1;

/// Check whether data starts with the hybrid envelope header
pub fn is_hybrid_envelope(data: &[u8]) -> bool {
    data.starts_with(HYBRID_MAGIC)
}

/// Generate a random 256-bit file key
pub fn generate_file_key() -> FileKey32 {
    let mut bytes = [0u8; FILE_KEY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    let key = FileKey32::new(bytes);
    bytes.zeroize();
    key
}

/// Encrypt everything `reader` yields into `writer`.
///
/// Returns the plaintext size in bytes.
pub fn encrypt_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    key: &RsaPublicKey,
) -> Result<u64> {
    let file_key = generate_file_key();
    let wrapped = key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), file_key.expose_secret())?;
    let wrapped_len = u16::try_from(wrapped.len())
        .map_err(|_| CoreError::Crypto("wrapped key does not fit the envelope header".into()))?;

    writer.write_all(HYBRID_MAGIC)?;
    writer.write_all(&wrapped_len.to_be_bytes())?;
    writer.write_all(&wrapped)?;
    writer.write_all(&(CHUNK_SIZE as u32).to_be_bytes())?;

    let cipher = XChaCha20Poly1305::new(file_key.expose_secret().into());
    let mut buf = Zeroizing::new(vec![0u8; CHUNK_SIZE]);
    let mut total = 0u64;

    for index in 0u64.. {
        let n = fill(&mut reader, &mut buf)?;
        let flag = if n < CHUNK_SIZE { FLAG_FINAL } else { FLAG_MORE };
        let frame = seal_chunk(&cipher, index, flag, &buf[..n])?;

        writer.write_all(&[flag])?;
        writer.write_all(&(frame.len() as u32).to_be_bytes())?;
        writer.write_all(&frame)?;
        total += n as u64;

        if flag == FLAG_FINAL {
            break;
        }
    }

    writer.flush()?;
    Ok(total)
}

/// Decrypt a hybrid envelope from `reader` into `writer`.
///
/// Returns the plaintext size in bytes.
pub fn decrypt_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    key: &RsaPrivateKey,
) -> Result<u64> {
    let mut magic = [0u8; HYBRID_MAGIC.len()];
    read_envelope(&mut reader, &mut magic, "header")?;
    if !is_hybrid_envelope(&magic) {
        return Err(CoreError::Crypto("not a hybrid envelope".into()));
    }

    let mut len16 = [0u8; 2];
    read_envelope(&mut reader, &mut len16, "wrapped key length")?;
    let mut wrapped = vec![0u8; u16::from_be_bytes(len16) as usize];
    read_envelope(&mut reader, &mut wrapped, "wrapped key")?;
    let file_key = unwrap_file_key(&wrapped, key)?;

    let mut len32 = [0u8; 4];
    read_envelope(&mut reader, &mut len32, "chunk size")?;
    let chunk_size = u32::from_be_bytes(len32) as usize;
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(CoreError::Crypto(format!("invalid chunk size {chunk_size}")));
    }

    let cipher = XChaCha20Poly1305::new(file_key.expose_secret().into());
    let mut total = 0u64;

    for index in 0u64.. {
        let mut flag = [0u8; 1];
        read_envelope(&mut reader, &mut flag, "missing final chunk")?;
        let flag = flag[0];
        if flag != FLAG_MORE && flag != FLAG_FINAL {
            return Err(CoreError::Crypto(format!("invalid chunk flag {flag:#04x}")));
        }

        read_envelope(&mut reader, &mut len32, "chunk length")?;
        let frame_len = u32::from_be_bytes(len32) as usize;
        if !(NONCE_SIZE + TAG_SIZE..=chunk_size + NONCE_SIZE + TAG_SIZE).contains(&frame_len) {
            return Err(CoreError::Crypto(format!(
                "chunk {index} has invalid length {frame_len}"
            )));
        }

        let mut frame = vec![0u8; frame_len];
        read_envelope(&mut reader, &mut frame, "chunk body")?;
        let plaintext = open_chunk(&cipher, index, flag, &frame)?;
        writer.write_all(&plaintext)?;
        total += plaintext.len() as u64;

        if flag == FLAG_FINAL {
            break;
        }
    }

    let mut probe = [0u8; 1];
    if fill(&mut reader, &mut probe)? != 0 {
        return Err(CoreError::Crypto(
            "trailing data after final chunk".into(),
        ));
    }

    writer.flush()?;
    Ok(total)
}

/// Encrypt plaintext in memory → hybrid envelope
pub fn encrypt_to_vec(plaintext: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encrypt_stream(Cursor::new(plaintext), &mut out, key)?;
    Ok(out)
}

/// Decrypt a hybrid envelope in memory → plaintext
pub fn decrypt_to_vec(ciphertext: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decrypt_stream(Cursor::new(ciphertext), &mut out, key)?;
    Ok(out)
}

fn unwrap_file_key(wrapped: &[u8], key: &RsaPrivateKey) -> Result<FileKey32> {
    let unwrapped = Zeroizing::new(key.decrypt(Oaep::new::<Sha256>(), wrapped)?);
    let mut bytes: [u8; FILE_KEY_SIZE] = unwrapped
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::Crypto("wrapped file key has the wrong length".into()))?;
    let file_key = FileKey32::new(bytes);
    bytes.zeroize();
    Ok(file_key)
}

fn seal_chunk(cipher: &XChaCha20Poly1305, index: u64, flag: u8, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let aad = build_aad(index, flag);
    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|e| CoreError::Crypto(format!("chunk {index} encryption failed: {e}")))?;

    let mut frame = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    frame.extend_from_slice(&nonce_bytes);
    frame.extend_from_slice(&ciphertext);
    Ok(frame)
}

fn open_chunk(
    cipher: &XChaCha20Poly1305,
    index: u64,
    flag: u8,
    frame: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let (nonce_bytes, ciphertext) = frame.split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);
    let aad = build_aad(index, flag);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: &aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| {
            CoreError::Crypto(format!(
                "chunk {index} failed authentication: wrong key, corrupted or reordered data"
            ))
        })
}

/// AAD: chunk_index (8 bytes BE) || final flag
fn build_aad(index: u64, flag: u8) -> [u8; 9] {
    let mut aad = [0u8; 9];
    aad[..8].copy_from_slice(&index.to_be_bytes());
    aad[8] = flag;
    aad
}

/// Read until `buf` is full or the reader is exhausted
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_envelope<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CoreError::Crypto(format!("truncated envelope: {what}")),
        _ => CoreError::Io(e),
    })
}
