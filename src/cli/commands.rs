use crate::coverage::session::CoverageSession;
use crate::resolve::resolve_coverage_tool;
use crate::types::errors::Error;
use crate::types::models::{
    DEFAULT_CHECK_ARGS, DEFAULT_CHECK_SCRIPT, DEFAULT_RCFILE, RunOutcome, RunSummary,
    RunnerConfig,
};
use crate::utils::io::save_summary;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Parser, Debug)]
#[command(
    name = "covrun",
    about = "Run the self-checks under a coverage tool, then combine and report",
    version
)]
pub struct Cli {
    /// Test selection for the check script, split into arguments like a shell would
    #[arg(allow_hyphen_values = true, default_value = DEFAULT_CHECK_ARGS)]
    pub checks: String,

    /// Only measure and report code matching this path (e.g. 'avocado/*')
    pub include: Option<String>,

    /// Coverage executable to look for; repeat to give several, in priority order
    #[arg(long = "tool", value_name = "NAME", env = "COVRUN_TOOL", value_delimiter = ',')]
    pub tools: Vec<String>,

    /// Entry point of the test suite, relative to the working directory
    #[arg(long, env = "COVRUN_CHECK_SCRIPT", default_value = DEFAULT_CHECK_SCRIPT)]
    pub check_script: PathBuf,

    /// Coverage configuration read by instrumented subprocesses
    #[arg(long, env = "COVRUN_RCFILE", default_value = DEFAULT_RCFILE)]
    pub rcfile: PathBuf,

    /// Directory to run in; data files and the start-up hook live here
    #[arg(short = 'C', long, default_value = ".")]
    pub workdir: PathBuf,

    /// Where to write the XML report (the tool's default is coverage.xml)
    #[arg(long)]
    pub xml_output: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn into_config(self) -> RunnerConfig {
        let mut config = RunnerConfig::new(self.workdir);
        if !self.tools.is_empty() {
            config.candidates = self.tools;
        }
        config.check_args = self.checks;
        config.include = self.include;
        config.check_script = self.check_script;
        config.rcfile = self.rcfile;
        config.xml_output = self.xml_output;
        config.summary = self.summary;
        config
    }
}

/// Locate the tool, run the session, and save the summary if asked.
///
/// The returned outcome carries the test suite's exit code; an `Err` means the
/// suite never ran.
pub fn execute_run_command(
    config: &RunnerConfig,
    interrupted: Option<Arc<AtomicBool>>,
) -> Result<RunOutcome, Error> {
    let tool = resolve_coverage_tool(
        &config.candidates,
        config.search_path.as_deref(),
        &config.workdir,
    )?;
    println!("Using coverage tool: {} ({})", tool.name, tool.path.display());

    let mut session = CoverageSession::new(config, tool)?;
    if let Some(flag) = interrupted {
        session = session.with_interrupt_flag(flag);
    }
    let outcome = session.run()?;

    let failed: Vec<_> = outcome.failed_steps().map(|s| s.step.as_str()).collect();
    if !failed.is_empty() {
        println!("Warning: coverage steps failed: {}", failed.join(", "));
    }

    if let Some(path) = &config.summary {
        let summary = RunSummary {
            tool: session.tool().clone(),
            check_script: config.check_script.clone(),
            check_args: config.check_args.clone(),
            include: config.include.clone(),
            outcome: outcome.clone(),
        };
        match save_summary(&summary, path) {
            Ok(()) => println!("Run summary saved to {}", path.display()),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save run summary"),
        }
    }

    println!("Test suite exited with status {}", outcome.exit_code);
    Ok(outcome)
}

