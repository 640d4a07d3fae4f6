// src/walk.rs
//! Candidate file discovery — a plain recursive listing

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// Every regular file under `root`, absolute, in traversal order.
///
/// Fails if `root` is missing or unreadable, or if any entry cannot be read.
pub fn list_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref().canonicalize()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = files.len(), "listed files");
    Ok(files)
}
