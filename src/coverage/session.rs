use crate::coverage::tool::display_command;
use crate::types::errors::Error;
use crate::types::models::{CoverageTool, RunOutcome, RunnerConfig, StepReport};
use crate::utils::cleanup::remove_stale_data_files;
use crate::utils::hook::StartupHook;
use crate::utils::paths::{PROCESS_START_ENV, data_file};
use crate::utils::signals::INTERRUPTED_EXIT_CODE;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How long the suite may keep running after an interrupt before it gets SIGTERM
pub const FORWARD_GRACE: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One coverage run: reset, instrumented test suite, combine, report.
pub struct CoverageSession<'a> {
    config: &'a RunnerConfig,
    tool: CoverageTool,
    workdir: PathBuf,
    rcfile: Option<String>,
    check_args: Vec<String>,
    xml_output: Option<PathBuf>,
    interrupted: Option<Arc<AtomicBool>>,
}

impl<'a> CoverageSession<'a> {
    pub fn new(config: &'a RunnerConfig, tool: CoverageTool) -> Result<Self, Error> {
        let workdir = std::path::absolute(&config.workdir)?;
        let rcfile = config.rcfile_arg()?;
        // Split like an unquoted shell expansion; "" yields no arguments
        let check_args = shlex::split(&config.check_args)
            .ok_or_else(|| Error::InvalidSelection(config.check_args.clone()))?;
        // Relative to where we were started, not to the tool's working directory
        let xml_output = config
            .xml_output
            .as_deref()
            .map(std::path::absolute)
            .transpose()?;
        Ok(Self {
            config,
            tool,
            workdir,
            rcfile,
            check_args,
            xml_output,
            interrupted: None,
        })
    }

    /// Share a flag set by the signal handler. Once it is set the suite is not
    /// started, a running suite is terminated after `FORWARD_GRACE`, and
    /// combining and reporting are skipped.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    pub fn tool(&self) -> &CoverageTool {
        &self.tool
    }

    /// Run every step. Only preparation failures are errors; afterwards the
    /// suite's exit code is final and report problems end up in `steps`.
    pub fn run(&self) -> Result<RunOutcome, Error> {
        self.reset()?;

        if self.was_interrupted() {
            tracing::warn!("interrupted before the test suite started");
            return Ok(RunOutcome {
                exit_code: INTERRUPTED_EXIT_CODE,
                steps: Vec::new(),
                interrupted: true,
            });
        }

        let exit_code = {
            let hook = StartupHook::install(&self.workdir)?;
            tracing::debug!(hook = %hook.path().display(), "start-up hook in place");
            self.run_suite()?
        };

        let interrupted = self.was_interrupted();
        let exit_code = match exit_code {
            Some(code) => code,
            None if interrupted => INTERRUPTED_EXIT_CODE,
            None => 1,
        };

        let steps = if interrupted {
            tracing::warn!("interrupted, skipping combine and reports");
            Vec::new()
        } else {
            self.aggregate_and_report()
        };

        Ok(RunOutcome {
            exit_code,
            steps,
            interrupted,
        })
    }

    fn was_interrupted(&self) -> bool {
        self.interrupted
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Erase aggregate data and drop per-process files from earlier runs
    fn reset(&self) -> Result<(), Error> {
        let mut erase = self
            .tool
            .erase_command(&self.workdir, self.rcfile.as_deref());
        let status = spawn_status(&mut erase)?;
        if !status.success() {
            return Err(Error::CommandFailed(format!(
                "'{}' exited with {}",
                display_command(&erase),
                status
            )));
        }

        let removed = remove_stale_data_files(&self.workdir)?;
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "removed leftover coverage data files");
        }
        Ok(())
    }

    /// Run the test suite under the tool; `None` when it was killed without a code
    fn run_suite(&self) -> Result<Option<i32>, Error> {
        let rcfile_path = self.config.rcfile_path()?;
        if !rcfile_path.exists() {
            tracing::warn!(
                rcfile = %rcfile_path.display(),
                "coverage config not found, subprocesses will use coverage defaults"
            );
        }

        let mut cmd = self.tool.run_command(
            &self.workdir,
            self.rcfile.as_deref(),
            self.config.include.as_deref(),
            &self.config.check_script,
            &self.check_args,
        );
        cmd.env(PROCESS_START_ENV, &rcfile_path)
            .env("PYTHONPATH", self.python_path()?);

        println!("Running: {}", display_command(&cmd));
        let mut child = cmd.spawn().map_err(|e| {
            Error::CommandFailed(format!(
                "Failed to execute '{}': {}",
                display_command(&cmd),
                e
            ))
        })?;
        let status = self.wait_suite(&mut child)?;
        tracing::debug!(%status, "test suite finished");
        Ok(exit_code_of(status))
    }

    /// Wait for the suite, terminating it if an interrupt is not honoured in time.
    ///
    /// A terminal Ctrl-C reaches the suite directly; a signal sent only to this
    /// process (e.g. a CI timeout) is passed on here.
    fn wait_suite(&self, child: &mut Child) -> Result<ExitStatus, Error> {
        let mut interrupted_at: Option<Instant> = None;
        let mut forwarded = false;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if !forwarded && self.was_interrupted() {
                let since = *interrupted_at.get_or_insert_with(Instant::now);
                if since.elapsed() >= FORWARD_GRACE {
                    tracing::warn!(pid = child.id(), "test suite ignored the interrupt, terminating it");
                    terminate(child)?;
                    forwarded = true;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// The working directory first, so the start-up hook wins over any other `sitecustomize`
    fn python_path(&self) -> Result<std::ffi::OsString, Error> {
        let mut entries = vec![self.workdir.clone()];
        if let Some(existing) = std::env::var_os("PYTHONPATH") {
            entries.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(entries)
            .map_err(|e| Error::CommandFailed(format!("Cannot build PYTHONPATH: {}", e)))
    }

    fn aggregate_and_report(&self) -> Vec<StepReport> {
        let rcfile = self.rcfile.as_deref();
        let include = self.config.include.as_deref();

        let mut combine = self.tool.combine_command(&self.workdir, rcfile);
        combine.stdout(Stdio::null());

        let steps = [
            ("combine", combine),
            (
                "report",
                self.tool.report_command(&self.workdir, rcfile, include),
            ),
            (
                "xml",
                self.tool
                    .xml_command(&self.workdir, rcfile, include, self.xml_output.as_deref()),
            ),
        ];

        let reports: Vec<StepReport> = steps
            .into_iter()
            .map(|(name, mut cmd)| run_step(name, &mut cmd))
            .collect();
        if reports.first().is_some_and(|combine| combine.success) {
            tracing::info!(path = %data_file(&self.workdir).display(), "combined coverage data");
        }
        reports
    }
}

/// Run a post-suite step; failures are logged and recorded, never returned
fn run_step(name: &str, cmd: &mut Command) -> StepReport {
    tracing::debug!(command = %display_command(cmd), "running {name}");
    match cmd.status() {
        Ok(status) => {
            if !status.success() {
                tracing::warn!(step = name, %status, "coverage step failed");
            }
            StepReport {
                step: name.to_string(),
                success: status.success(),
                exit_code: status.code(),
            }
        }
        Err(e) => {
            tracing::warn!(step = name, error = %e, "could not start coverage step");
            StepReport {
                step: name.to_string(),
                success: false,
                exit_code: None,
            }
        }
    }
}

fn spawn_status(cmd: &mut Command) -> Result<ExitStatus, Error> {
    cmd.status().map_err(|e| {
        Error::CommandFailed(format!(
            "Failed to execute '{}': {}",
            display_command(cmd),
            e
        ))
    })
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> io::Result<()> {
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    // SAFETY: the child has not been reaped yet, so the pid still refers to it
    if unsafe { libc::kill(pid, libc::SIGTERM) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> io::Result<()> {
    child.kill()
}

/// Exit code as a shell would report it: signals map to 128 + signal number
pub fn exit_code_of(status: ExitStatus) -> Option<i32> {
    if let Some(code) = status.code() {
        return Some(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }
    None
}
