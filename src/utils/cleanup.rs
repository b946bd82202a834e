use crate::utils::paths::PARALLEL_DATA_PATTERN;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use wildmatch::WildMatch;

/// Files directly inside `dir` whose name matches `pattern`
pub fn matching_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let wildcard = WildMatch::new(pattern);
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| wildcard.matches(name))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Remove per-process data files left behind by an earlier run.
///
/// Returns the paths that were removed. A file vanishing between the scan and
/// the removal is not an error.
pub fn remove_stale_data_files(workdir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for path in matching_files(workdir, PARALLEL_DATA_PATTERN) {
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed stale coverage data");
                removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (),
            Err(e) => {
                return Err(io::Error::new(
                    e.kind(),
                    format!("Failed to remove '{}': {}", path.display(), e),
                ));
            }
        }
    }

    Ok(removed)
}

