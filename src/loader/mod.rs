//! Discovery of captured account pages on disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Every file in `dir` whose name ends with `suffix`, sorted by file name.
///
/// Chronological order relies on the capture naming scheme (`sep01.html`,
/// `sep02.html`, ...). Dates inside the pages are not consulted.
pub fn discover_pages(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Could not read pages dir {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(suffix))
            .unwrap_or(false);
        if path.is_file() && matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("{} pages in {:?}", files.len(), dir);
    Ok(files)
}
