use crate::types::errors::Error;
use crate::utils::cleanup::matching_files;
use crate::utils::paths::{hook_cache_dir, hook_cache_pattern, hook_path};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Makes every Python process started with `COVERAGE_PROCESS_START` set begin measuring
pub const HOOK_SOURCE: &str = "import coverage\ncoverage.process_startup()\n";

/// A `sitecustomize.py` written into the working directory for the duration of a run.
///
/// The file (and any bytecode Python compiled from it) is removed when the guard
/// is dropped, so a failing or interrupted test suite does not leave it behind.
#[derive(Debug)]
pub struct StartupHook {
    path: PathBuf,
    workdir: PathBuf,
    cache_dir_preexisting: bool,
}

impl StartupHook {
    pub fn install(workdir: &Path) -> Result<Self, Error> {
        let path = hook_path(workdir);
        let cache_dir_preexisting = hook_cache_dir(workdir).exists();

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::HookExists(path));
            }
            Err(e) => {
                return Err(Error::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to create start-up hook '{}': {}", path.display(), e),
                )));
            }
        };

        // From here on the file exists, so let Drop clean up a partial write
        let hook = Self {
            path,
            workdir: workdir.to_path_buf(),
            cache_dir_preexisting,
        };
        file.write_all(HOOK_SOURCE.as_bytes())?;
        file.flush()?;

        tracing::debug!(path = %hook.path.display(), "installed start-up hook");
        Ok(hook)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => (),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (),
            Err(e) => return Err(e),
        }

        let cache_dir = hook_cache_dir(&self.workdir);
        for compiled in matching_files(&cache_dir, &hook_cache_pattern()) {
            fs::remove_file(compiled)?;
        }
        if !self.cache_dir_preexisting && cache_dir.is_dir() {
            // Only succeeds when nothing else was cached there
            let _ = fs::remove_dir(&cache_dir);
        }

        Ok(())
    }
}

impl Drop for StartupHook {
    fn drop(&mut self) {
        match self.remove() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed start-up hook"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove start-up hook"
            ),
        }
    }
}
