//! Discovery of the `.eio` file written next to a result table.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Finds the run-period file for `results`.
///
/// Prefers `<stem>.eio` beside the result table, then the first `*.eio`
/// (case-insensitive, by file name order) in the same directory.
pub fn companion_eio(results: &Path) -> Option<PathBuf> {
    let sibling = results.with_extension("eio");
    if sibling.is_file() {
        debug!(path = %sibling.display(), "using sibling run-period file");
        return Some(sibling);
    }

    let dir = match results.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("eio"))
        })
        .collect();
    candidates.sort();
    let found = candidates.into_iter().next();
    if let Some(path) = &found {
        debug!(path = %path.display(), "using run-period file from result directory");
    }
    found
}
