//! Log file discovery.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// List the entries directly under `root` (non-recursive), sorted by file name.
///
/// Every entry is returned, directories included, as a full path joined onto
/// `root`. Read failures surface as [`Error::Io`] carrying the underlying error.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|e| Error::io(root, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        files.push(root.join(entry.file_name()));
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!("Found {} entries in {}", files.len(), root.display());

    Ok(files)
}
