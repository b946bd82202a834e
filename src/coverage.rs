pub mod session;
pub mod tool;

// Re-export main entry points
pub use session::{CoverageSession, exit_code_of};
pub use tool::display_command;
