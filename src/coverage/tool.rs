use crate::types::models::CoverageTool;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Command lines for the coverage tool's subcommands.
///
/// Every command runs in `workdir`; `rcfile` is an optional `--rcfile=...`
/// argument placed right after the subcommand.
impl CoverageTool {
    fn subcommand(&self, workdir: &Path, name: &str, rcfile: Option<&str>) -> Command {
        let mut cmd = Command::new(self.path());
        cmd.current_dir(workdir).arg(name);
        if let Some(rcfile) = rcfile {
            cmd.arg(rcfile);
        }
        cmd
    }

    pub fn erase_command(&self, workdir: &Path, rcfile: Option<&str>) -> Command {
        self.subcommand(workdir, "erase", rcfile)
    }

    /// `run [--include=PATH] <script> [<check args>...]`
    pub fn run_command(
        &self,
        workdir: &Path,
        rcfile: Option<&str>,
        include: Option<&str>,
        check_script: &Path,
        check_args: &[String],
    ) -> Command {
        let mut cmd = self.subcommand(workdir, "run", rcfile);
        if let Some(include) = include {
            cmd.arg(format!("--include={include}"));
        }
        cmd.arg(check_script).args(check_args);
        cmd
    }

    pub fn combine_command(&self, workdir: &Path, rcfile: Option<&str>) -> Command {
        self.subcommand(workdir, "combine", rcfile)
    }

    /// Console summary with missing line numbers
    pub fn report_command(
        &self,
        workdir: &Path,
        rcfile: Option<&str>,
        include: Option<&str>,
    ) -> Command {
        let mut cmd = self.subcommand(workdir, "report", rcfile);
        cmd.arg("-m");
        if let Some(include) = include {
            cmd.arg(format!("--include={include}"));
        }
        cmd
    }

    pub fn xml_command(
        &self,
        workdir: &Path,
        rcfile: Option<&str>,
        include: Option<&str>,
        output: Option<&Path>,
    ) -> Command {
        let mut cmd = self.subcommand(workdir, "xml", rcfile);
        if let Some(include) = include {
            cmd.arg(format!("--include={include}"));
        }
        if let Some(output) = output {
            cmd.arg("-o").arg(output);
        }
        cmd
    }
}

/// Render a command for log lines, e.g. `coverage3 report -m`
pub fn display_command(cmd: &Command) -> String {
    let program = Path::new(cmd.get_program())
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| cmd.get_program().to_os_string());
    std::iter::once(program.to_string_lossy().into_owned())
        .chain(cmd.get_args().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}
