use crate::error::{ReportError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Buffered writer appending to `path`, creating the file if missing.
pub fn append_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// True when `path` is missing or has no content yet.
pub fn file_is_empty(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true)
}

/// Put `tmp` in place of `dest` with a single rename over the destination.
/// A reader observes either the old file or the new one, never a mix.
pub fn replace_file(tmp: NamedTempFile, dest: &Path) -> Result<()> {
    tmp.persist(dest).map_err(|e| ReportError::Replace {
        path: dest.display().to_string(),
        source: e.error,
    })?;
    Ok(())
}
