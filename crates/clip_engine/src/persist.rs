use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

const MAX_RENAME_ATTEMPTS: usize = 1_000;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free name for {0} after {MAX_RENAME_ATTEMPTS} attempts")]
    NoFreeName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// `clip.mp4`, `clip (1).mp4`, `clip (2).mp4`, ...
pub fn numbered_name(filename: &str, n: usize) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{filename} ({n})"),
    }
}

/// Moves a finished temp file to `{dir}/{filename}`, taking the next numbered
/// name on collision. Existing files are never replaced.
pub fn persist_unique(
    mut tmp: NamedTempFile,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, PersistError> {
    for n in 0..MAX_RENAME_ATTEMPTS {
        let target = dir.join(numbered_name(filename, n));
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => tmp = err.file,
            Err(err) => return Err(PersistError::Io(err.error)),
        }
    }
    Err(PersistError::NoFreeName(filename.to_string()))
}
