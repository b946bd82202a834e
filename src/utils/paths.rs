use std::path::{Path, PathBuf};

/// Module name Python imports automatically at interpreter start
pub const HOOK_MODULE: &str = "sitecustomize";

/// Aggregate coverage data file
pub const DATA_FILE: &str = ".coverage";

/// Per-process data files written in parallel mode, e.g. `.coverage.host.1234.567890`
pub const PARALLEL_DATA_PATTERN: &str = ".coverage.*";

pub const PROCESS_START_ENV: &str = "COVERAGE_PROCESS_START";

/// Location of the start-up hook inside the working directory
pub fn hook_path(workdir: &Path) -> PathBuf {
    workdir.join(format!("{HOOK_MODULE}.py"))
}

/// Bytecode cache directory Python may write next to the hook
pub fn hook_cache_dir(workdir: &Path) -> PathBuf {
    workdir.join("__pycache__")
}

/// Pattern for the compiled hook, e.g. `sitecustomize.cpython-312.pyc`
pub fn hook_cache_pattern() -> String {
    format!("{HOOK_MODULE}.*.pyc")
}

pub fn data_file(workdir: &Path) -> PathBuf {
    workdir.join(DATA_FILE)
}
