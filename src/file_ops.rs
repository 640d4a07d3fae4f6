// src/file_ops.rs
//! File-level encryption/decryption operations
//!
//! Builds on the pure primitives in `crypto` and owns the filesystem side:
//! derived naming (`name` ↔ `name.oops`) and replacement.
//!
//! Output is written to a temp sibling, fsync'd, then renamed over the
//! target. The source is removed only after the rename has landed, so a
//! failure at any step leaves at least one complete copy on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rsa::{RsaPrivateKey, RsaPublicKey};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::consts::{ENCRYPTED_SUFFIX, HYBRID_MAGIC};
use crate::crypto::{hybrid, is_hybrid_envelope, single_block};
use crate::enums::Scheme;
use crate::error::{CoreError, Result};

/// `name` → `name.oops`
pub fn encrypted_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// `name.oops` → `name`; anything without the suffix is refused
pub fn decrypted_path(path: &Path) -> Result<PathBuf> {
    let suffix = ENCRYPTED_SUFFIX.trim_start_matches('.');
    match path.extension() {
        Some(ext) if ext == suffix => Ok(path.with_extension("")),
        _ => Err(CoreError::MissingSuffix(path.to_path_buf())),
    }
}

/// Encrypt a file in place: `path` is replaced by `path.oops`.
///
/// Returns the plaintext size in bytes.
pub fn encrypt_file(path: &Path, key: &RsaPublicKey, scheme: Scheme) -> Result<u64> {
    debug!(path = %path.display(), %scheme, "encrypting");
    let target = encrypted_path(path);

    let size = match scheme {
        Scheme::SingleBlock => {
            let plaintext = Zeroizing::new(fs::read(path)?);
            let ciphertext = single_block::encrypt_to_vec(&plaintext, key)?;
            write_replacing(&target, path, |w| Ok(w.write_all(&ciphertext)?))?;
            plaintext.len() as u64
        }
        Scheme::Hybrid => {
            let reader = BufReader::new(File::open(path)?);
            write_replacing(&target, path, move |w| hybrid::encrypt_stream(reader, w, key))?
        }
    };

    fs::remove_file(path)?;
    Ok(size)
}

/// Decrypt a `.oops` file in place, restoring the original name.
///
/// The envelope scheme is detected from the file header. Returns the
/// plaintext size in bytes.
pub fn decrypt_file(path: &Path, key: &RsaPrivateKey) -> Result<u64> {
    let target = decrypted_path(path)?;
    let mut file = File::open(path)?;

    let mut head = Vec::with_capacity(HYBRID_MAGIC.len());
    (&mut file)
        .take(HYBRID_MAGIC.len() as u64)
        .read_to_end(&mut head)?;

    let size = if is_hybrid_envelope(&head) {
        debug!(path = %path.display(), scheme = "hybrid", "decrypting");
        let reader = head.as_slice().chain(BufReader::new(file));
        write_replacing(&target, path, move |w| hybrid::decrypt_stream(reader, w, key))?
    } else {
        debug!(path = %path.display(), scheme = "single-block", "decrypting");
        let mut ciphertext = head;
        file.read_to_end(&mut ciphertext)?;
        let plaintext = Zeroizing::new(single_block::decrypt_to_vec(&ciphertext, key)?);
        write_replacing(&target, path, |w| Ok(w.write_all(&plaintext)?))?;
        plaintext.len() as u64
    };

    fs::remove_file(path)?;
    Ok(size)
}

/// Write `target` through a temp sibling that inherits `source`'s permissions.
///
/// Nothing appears at `target` unless `write` succeeds and the data is synced.
fn write_replacing<T, F>(target: &Path, source: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<T>,
{
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(parent)?;
    let out = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let out = write(&mut writer)?;
        writer.flush()?;
        out
    };

    tmp.as_file()
        .set_permissions(fs::metadata(source)?.permissions())?;
    tmp.as_file().sync_all()?;
    tmp.persist(target)?;

    #[cfg(unix)]
    if let Err(e) = sync_dir(parent) {
        warn!(dir = %parent.display(), error = %e, "rename may not survive a crash");
    }

    Ok(out)
}

/// fsync a directory so a rename inside it is durable
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypted_path_appends_suffix() {
        assert_eq!(
            encrypted_path(Path::new("/data/report.pdf")),
            PathBuf::from("/data/report.pdf.oops")
        );
        assert_eq!(encrypted_path(Path::new("noext")), PathBuf::from("noext.oops"));
    }

    #[test]
    fn decrypted_path_strips_suffix() {
        assert_eq!(
            decrypted_path(Path::new("/data/report.pdf.oops")).unwrap(),
            PathBuf::from("/data/report.pdf")
        );
        assert_eq!(decrypted_path(Path::new("a.oops")).unwrap(), PathBuf::from("a"));
    }

    #[test]
    fn decrypted_path_requires_suffix() {
        for p in ["report.pdf", "dir/.oops", "report.oops.bak"] {
            assert!(
                matches!(decrypted_path(Path::new(p)), Err(CoreError::MissingSuffix(_))),
                "{p} should be refused"
            );
        }
    }

    #[test]
    fn naming_round_trips() {
        let original = Path::new("/x/y/z.tar.gz");
        assert_eq!(decrypted_path(&encrypted_path(original)).unwrap(), original);
    }

    #[cfg(unix)]
    #[test]
    fn sync_dir_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sync_dir(dir.path()).is_ok());
        assert!(sync_dir(&dir.path().join("gone")).is_err());
    }
}
