//! Download staging directory management.
//!
//! The staging directory is exclusively owned by one pipeline run. It is
//! force-reset (removed and recreated) before the run starts and again right
//! before the export is triggered, so the only file that can ever be found in
//! it is the export the remote console just produced.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Failed to reset staging directory '{path}': {source}")]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to scan staging directory '{path}': {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, StagingError>;

/// A file the remote console deposited into the staging directory.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Removes the staging directory with everything in it and recreates it empty.
pub fn reset(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => debug!(path = %dir.display(), "staging directory removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(StagingError::Reset {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    }
    std::fs::create_dir_all(dir).map_err(|e| StagingError::Reset {
        path: dir.to_path_buf(),
        source: e,
    })?;
    debug!(path = %dir.display(), "staging directory recreated");
    Ok(())
}

/// Resolves "the" export in the staging directory: the most recently modified
/// non-hidden file, or `None` when the directory is empty.
pub fn latest_download(dir: &Path) -> Result<Option<StagedFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| StagingError::Scan {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        let modified = entry
            .metadata()
            .map_err(|e| StagingError::Scan {
                path: dir.to_path_buf(),
                source: e,
            })?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push(StagedFile {
            file_name,
            path: entry.path().to_path_buf(),
            modified,
        });
    }
    Ok(pick_latest(files))
}

/// Newest modification time wins; on a tie the first entry encountered wins,
/// which keeps the choice deterministic for a given directory order.
fn pick_latest(files: Vec<StagedFile>) -> Option<StagedFile> {
    let mut latest: Option<StagedFile> = None;
    for file in files {
        match &latest {
            Some(current) if file.modified <= current.modified => {}
            _ => latest = Some(file),
        }
    }
    latest
}
