//! File system utilities for bundle assembly.
//!
//! Provides copy operations with automatic parent directory creation and
//! fatal errors on missing sources.

use crate::error::StageError;
use std::io;
use std::path::Path;
use tokio::fs;

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<(), StageError> {
    if !from.is_file() {
        return Err(StageError::MissingInput {
            path: from.to_path_buf(),
        });
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await?;
    Ok(())
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Fails if the source path is not a directory or doesn't exist.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<(), StageError> {
    // Validate in async context before offloading the traversal
    if !from.is_dir() {
        return Err(StageError::MissingInput {
            path: from.to_path_buf(),
        });
    }

    // Clone paths for move into blocking closure
    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(io::Error::from)?;
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| io::Error::other(e.to_string()))?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(dest_path)?;
            } else {
                std::fs::copy(entry.path(), dest_path)?;
            }
        }

        Ok::<(), io::Error>(())
    })
    .await
    .map_err(|e| {
        StageError::Io(io::Error::other(format!(
            "directory copy task panicked: {}",
            e
        )))
    })??;

    Ok(())
}
