//! Atomic writer for synced posts.
//!
//! ## `atomic_write` protocol
//!
//! 1. Content and the change decision come from the transformer.
//! 2. Dry-run stops here and reports `WouldWrite`.
//! 3. Ensure the publications directory exists.
//! 4. Write to `<path>.postsync.tmp`.
//! 5. Rename to the final path (atomic on POSIX); remove the tmp on failure.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};
use crate::transform::Decision;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual post write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: the local copy already matches.
    Unchanged { path: PathBuf },
    /// File was skipped: the local copy was edited by hand.
    LocallyModified { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::LocallyModified { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Carry out a transformer decision.
pub fn apply(decision: Decision, dry_run: bool) -> Result<WriteResult, SyncError> {
    match decision {
        Decision::Unchanged { path } => {
            tracing::debug!(path = %path.display(), "unchanged");
            Ok(WriteResult::Unchanged { path })
        }
        Decision::LocallyModified { path } => {
            tracing::warn!(
                path = %path.display(),
                "edited locally since last sync, skipping (use --force to overwrite)"
            );
            Ok(WriteResult::LocallyModified { path })
        }
        Decision::Write { path, content, .. } => atomic_write(&path, &content, dry_run),
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.postsync.tmp", path.display()));
    atomic_write_with_tmp(path, content, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if dry_run {
        tracing::info!(path = %path.display(), dry_run = true, "would write");
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!(path = %path.display(), "wrote");
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
