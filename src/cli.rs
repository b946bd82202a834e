pub mod commands;

pub use commands::{Cli, execute_run_command};
