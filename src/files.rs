//! Migration directory listing

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// List entries in `dir` whose name ends with `extension`, skipping directories.
///
/// Symlinks are followed, so a linked migration is listed like a regular
/// file; a dangling link is still listed by name. Unlike a substring match,
/// `V1__init.sql.bak` is not picked up for `.sql`. Results are sorted by
/// path so lint output is stable.
pub async fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_dir = fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            continue;
        }

        let name = entry.file_name();
        if name.to_string_lossy().ends_with(extension) {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

/// File name component of a listed path, lossily decoded
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
