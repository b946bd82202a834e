use serde::Serialize;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Coverage executables to look for, in priority order
pub const DEFAULT_CANDIDATES: &[&str] = &["coverage3", "python3-coverage", "coverage"];

/// Test selection used when none is given: skip slow or environment-dependent checks
pub const DEFAULT_CHECK_ARGS: &str = "--skip=static-checks";

pub const DEFAULT_CHECK_SCRIPT: &str = "selftests/check.py";

pub const DEFAULT_RCFILE: &str = ".coveragerc";

/// Everything a coverage run needs, resolved once from the command line
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub candidates: Vec<String>,
    pub check_args: String,
    pub include: Option<String>,
    pub check_script: PathBuf,
    pub rcfile: PathBuf,
    pub workdir: PathBuf,
    /// Search path for the coverage tool; `None` means `$PATH`
    pub search_path: Option<OsString>,
    pub xml_output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(|c| c.to_string()).collect(),
            check_args: DEFAULT_CHECK_ARGS.to_string(),
            include: None,
            check_script: PathBuf::from(DEFAULT_CHECK_SCRIPT),
            rcfile: PathBuf::from(DEFAULT_RCFILE),
            workdir: workdir.into(),
            search_path: None,
            xml_output: None,
            summary: None,
        }
    }

    /// The rcfile as subprocesses must see it, independent of their cwd
    pub fn rcfile_path(&self) -> io::Result<PathBuf> {
        std::path::absolute(self.workdir.join(&self.rcfile))
    }

    /// `--rcfile=...` for the coverage subcommands, only when a non-default file was asked for
    pub fn rcfile_arg(&self) -> io::Result<Option<String>> {
        if self.rcfile == Path::new(DEFAULT_RCFILE) {
            return Ok(None);
        }
        Ok(Some(format!("--rcfile={}", self.rcfile_path()?.display())))
    }
}

/// A coverage executable picked from the candidate list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageTool {
    pub name: String,
    pub path: PathBuf,
}

impl CoverageTool {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of one post-run step (combine, report, xml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Exit code of the test suite; this is what the runner exits with
    pub exit_code: i32,
    pub steps: Vec<StepReport>,
    pub interrupted: bool,
}

impl RunOutcome {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| !s.success)
    }
}

/// Record of a whole run, saved with `--summary`
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub tool: CoverageTool,
    pub check_script: PathBuf,
    pub check_args: String,
    pub include: Option<String>,
    pub outcome: RunOutcome,
}
