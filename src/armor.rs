// src/armor.rs
//! Strict PEM armor for key files
//!
//! One block per file, nothing before `-----BEGIN`, nothing after the
//! newline that terminates `-----END`. Anything else is a format error
//! rather than something to skip over. The block itself is RFC 7468
//! encapsulation, handled by the `pem-rfc7468` codec `rsa` already ships.

use rsa::pkcs8::der::pem::{self, LineEnding};

use crate::error::{CoreError, Result};

const BEGIN: &[u8] = b"-----BEGIN ";
const END: &[u8] = b"-----END ";

/// A decoded armored block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmoredBlock {
    pub label: String,
    pub payload: Vec<u8>,
}

/// Wrap `payload` in a single armored block labelled `label`
pub fn encode(label: &str, payload: &[u8]) -> Result<String> {
    pem::encode_string(label, LineEnding::LF, payload)
        .map_err(|e| CoreError::KeyFormat(format!("failed to armor {label}: {e}")))
}

/// Decode exactly one armored block; trailing bytes are rejected
pub fn decode(input: &[u8]) -> Result<ArmoredBlock> {
    if !input.starts_with(BEGIN) {
        return Err(CoreError::KeyFormat("no armored block found".into()));
    }

    let end_at = find(input, END)
        .ok_or_else(|| CoreError::KeyFormat("missing END line".into()))?;
    let end_line = &input[end_at..];
    let close = end_line[END.len()..]
        .windows(5)
        .position(|w| w == b"-----")
        .map(|i| END.len() + i + 5)
        .ok_or_else(|| CoreError::KeyFormat("malformed END line".into()))?;

    let trailing = &end_line[close..];
    if !matches!(trailing, b"" | b"\n" | b"\r\n") {
        return Err(CoreError::KeyFormat(format!(
            "{} trailing byte(s) after armored block",
            trailing.len()
        )));
    }

    let (label, payload) = pem::decode_vec(input)
        .map_err(|e| CoreError::KeyFormat(format!("malformed armored block: {e}")))?;

    Ok(ArmoredBlock {
        label: label.to_owned(),
        payload,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
