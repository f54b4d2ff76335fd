use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
#[error("failed to read {path:?}: {source}")]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// Files collected from a directory walk plus the entries that could not be
/// read along the way. Partial results stay valid; the caller decides whether
/// the errors are acceptable.
#[derive(Debug, Default)]
pub struct Scan {
    pub files: Vec<PathBuf>,
    pub errors: Vec<ScanError>,
}

/// Collect all regular files under `path` whose extension equals `ext`
/// (leading dot optional); `"*"` accepts every file. A non-directory `path`
/// yields an empty scan. An unreadable top-level directory is an error;
/// unreadable entries below it are accumulated in `Scan::errors`.
pub fn scan(path: &Path, ext: &str) -> Result<Scan> {
    let mut scan = Scan::default();
    if !path.is_dir() {
        return Ok(scan);
    }
    fs::read_dir(path).with_context(|| format!("failed to read directory {:?}", path))?;
    for entry in WalkDir::new(path) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && matches_ext(entry.path(), ext) {
                    scan.files.push(entry.into_path());
                }
            }
            Err(err) => {
                let err_path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| path.to_path_buf());
                scan.errors.push(ScanError {
                    path: err_path,
                    source: err,
                });
            }
        }
    }
    scan.files.sort();
    Ok(scan)
}

fn matches_ext(path: &Path, ext: &str) -> bool {
    if ext == "*" {
        return true;
    }
    path.extension().and_then(|e| e.to_str()) == Some(ext.trim_start_matches('.'))
}
