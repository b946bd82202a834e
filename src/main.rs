use clap::Parser;
use covrun::cli::{Cli, execute_run_command};
use covrun::utils::{logging, signals};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = cli.into_config();

    let interrupted = match signals::install_interrupt_flag() {
        Ok(flag) => Some(flag),
        Err(e) => {
            tracing::warn!(error = %e, "could not install Ctrl-C handler");
            None
        }
    };

    match execute_run_command(&config, interrupted) {
        // Codes outside 0..=255 only occur off Unix; keep them non-zero
        Ok(outcome) => u8::try_from(outcome.exit_code)
            .map(ExitCode::from)
            .unwrap_or(ExitCode::FAILURE),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
