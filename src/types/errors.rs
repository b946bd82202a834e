use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No coverage tool found (searched: {}). Please install coverage for Python 3", .candidates.join(", "))]
    ToolNotFound { candidates: Vec<String> },

    #[error("Refusing to overwrite existing start-up hook '{}'", .0.display())]
    HookExists(PathBuf),

    #[error("Cannot split test selection '{0}' into arguments (unbalanced quotes?)")]
    InvalidSelection(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}
