//! Static folder synchronization and asset installation.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::hooks::FileProcessor;
use crate::util::is_hidden;

/// Cookie consent script written by [`install_cookie_script`].
pub const COOKIE_NOTICE_SCRIPT: &str = include_str!("../../assets/cookie-notice.js");

/// Output-relative location of the cookie consent script.
pub const COOKIE_NOTICE_PATH: &str = "js/cookie-notice.js";

#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("source folder does not exist: {0}")]
    FolderNotFound(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl SyncError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Counters of a folder sync.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub copied: usize,
    pub processed: usize,
    /// Destination already up to date
    pub skipped: usize,
}

/// Mirror `source` into `target`, depth first, entries sorted by name.
///
/// A file whose destination is not older than itself is skipped. Otherwise
/// the stale destination is removed and the file is either handed to the
/// processor registered for its lowercase extension or copied as is.
pub fn sync_folder(
    source: &Path,
    target: &Path,
    include_hidden: bool,
    processors: &HashMap<String, FileProcessor>,
) -> Result<SyncStats, SyncError> {
    if !source.is_dir() {
        return Err(SyncError::FolderNotFound(source.to_path_buf()));
    }

    let mut stats = SyncStats::default();
    fs::create_dir_all(target).map_err(SyncError::io(target))?;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|source_err| SyncError::ReadDir {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(SyncError::io(&destination))?;
            continue;
        }

        if is_up_to_date(entry.path(), &destination) {
            tracing::debug!("up to date: {}", destination.display());
            stats.skipped += 1;
            continue;
        }

        if destination.exists() {
            fs::remove_file(&destination).map_err(SyncError::io(&destination))?;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(SyncError::io(parent))?;
        }

        match extension_of(entry.path()).and_then(|ext| processors.get(&ext)) {
            Some(processor) => {
                tracing::debug!("processing {}", entry.path().display());
                processor(entry.path(), &destination).map_err(SyncError::io(&destination))?;
                stats.processed += 1;
            }
            None => {
                tracing::debug!("copying {}", entry.path().display());
                fs::copy(entry.path(), &destination).map_err(SyncError::io(&destination))?;
                stats.copied += 1;
            }
        }
    }

    Ok(stats)
}

/// Lowercase extension of a path, as used for processor lookup.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

fn is_up_to_date(source: &Path, destination: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(source), modified(destination)) {
        (Some(src), Some(dest)) => dest >= src,
        _ => false,
    }
}

/// Copy one optional file into `to_dir`, keeping its file name.
///
/// Returns `false` without error when `source` does not exist.
pub fn install_file(source: &Path, to_dir: &Path) -> Result<bool, SyncError> {
    if !source.is_file() {
        tracing::debug!("optional asset not found: {}", source.display());
        return Ok(false);
    }
    let Some(name) = source.file_name() else {
        return Ok(false);
    };

    fs::create_dir_all(to_dir).map_err(SyncError::io(to_dir))?;
    let destination = to_dir.join(name);
    fs::copy(source, &destination).map_err(SyncError::io(&destination))?;
    Ok(true)
}

/// Write the bundled cookie consent script under `output_root`.
pub fn install_cookie_script(output_root: &Path) -> Result<PathBuf, SyncError> {
    let destination = output_root.join(COOKIE_NOTICE_PATH);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(SyncError::io(parent))?;
    }
    fs::write(&destination, COOKIE_NOTICE_SCRIPT).map_err(SyncError::io(&destination))?;
    Ok(destination)
}
