use crate::types::errors::Error;
use crate::types::models::CoverageTool;
use std::ffi::OsStr;
use std::path::Path;

/// Pick the first candidate found on `search_path`, falling back to `$PATH`
pub fn resolve_coverage_tool(
    candidates: &[String],
    search_path: Option<&OsStr>,
    cwd: &Path,
) -> Result<CoverageTool, Error> {
    let path_var = match search_path {
        Some(paths) => Some(paths.to_os_string()),
        None => std::env::var_os("PATH"),
    };

    for candidate in candidates {
        match which::which_in(candidate, path_var.as_ref(), cwd) {
            Ok(path) => {
                tracing::debug!(candidate = %candidate, path = %path.display(), "found coverage tool");
                return Ok(CoverageTool::new(candidate.as_str(), path));
            }
            Err(e) => {
                tracing::trace!(candidate = %candidate, error = %e, "candidate not on search path");
            }
        }
    }

    Err(Error::ToolNotFound {
        candidates: candidates.to_vec(),
    })
}
