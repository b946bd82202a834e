// tests/common/mod.rs
#![allow(dead_code)]

use covrun::types::models::RunnerConfig;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_COVERAGE: &str = include_str!("../fixtures/fake_coverage.sh");

/// A scratch project with a `bin/` directory of fake coverage tools and a
/// working directory to run in.
pub struct FakeCoverage {
    pub root: TempDir,
    pub bin_dir: PathBuf,
    pub workdir: PathBuf,
    pub log: PathBuf,
}

impl FakeCoverage {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let bin_dir = root.path().join("bin");
        let workdir = root.path().join("work");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::create_dir_all(workdir.join("selftests")).unwrap();
        fs::write(workdir.join("selftests/check.py"), "").unwrap();
        fs::write(workdir.join(".coveragerc"), "[run]\nparallel = True\n").unwrap();
        let log = root.path().join("invocations.log");

        Self {
            root,
            bin_dir,
            workdir,
            log,
        }
    }

    /// Put an executable named `name` on the search path
    pub fn install(&self, name: &str, run_status: i32, report_status: i32) -> PathBuf {
        let script = FAKE_COVERAGE
            .replace("@LOG@", &self.log.display().to_string())
            .replace("@RUN_STATUS@", &run_status.to_string())
            .replace("@REPORT_STATUS@", &report_status.to_string());
        let path = self.bin_dir.join(name);
        write_executable(&path, &script);
        path
    }

    pub fn search_path(&self) -> OsString {
        self.bin_dir.clone().into_os_string()
    }

    pub fn config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::new(&self.workdir);
        config.search_path = Some(self.search_path());
        config
    }

    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Invocations only (first word is a coverage subcommand)
    pub fn subcommands(&self) -> Vec<String> {
        self.log_lines()
            .into_iter()
            .filter(|line| {
                ["erase", "run", "combine", "report", "xml"]
                    .iter()
                    .any(|sub| line.split_whitespace().next() == Some(sub))
            })
            .collect()
    }

    /// Arguments the suite received after the check script, one per element
    pub fn run_args(&self) -> Vec<String> {
        self.log_lines()
            .iter()
            .filter_map(|l| l.strip_prefix("arg=[")?.strip_suffix(']'))
            .skip_while(|a| *a != "selftests/check.py")
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    /// `PATH` with the fake tools first, keeping the system utilities the scripts use
    pub fn path_with_fake_bin(&self) -> OsString {
        let mut entries = vec![self.bin_dir.clone()];
        if let Some(path) = std::env::var_os("PATH") {
            entries.extend(std::env::split_paths(&path));
        }
        std::env::join_paths(entries).unwrap()
    }

    /// Install a `coverage3` whose `run` executes `run_body` in the working directory
    pub fn install_run_script(&self, run_body: &str) {
        write_executable(
            &self.bin_dir.join("coverage3"),
            &format!(
                "#!/bin/sh\necho \"$*\" >> '{}'\nif [ \"$1\" = run ]; then\n{}\nfi\nexit 0\n",
                self.log.display(),
                run_body
            ),
        );
    }

    /// Block until the suite has written `started` into the working directory
    pub fn wait_for_start(&self) {
        let marker = self.workdir.join("started");
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(20);
        while !marker.exists() {
            assert!(std::time::Instant::now() < deadline, "suite never started");
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
    }

    pub fn clear_log(&self) {
        let _ = fs::remove_file(&self.log);
    }
}

pub fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
