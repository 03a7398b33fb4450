use std::path::Path;

use thiserror::Error;
use utils::process::ExecError;

/// Errors that can occur during version-control operations
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("not under version control: {0}")]
    NotVersioned(String),

    #[error("could not parse {tool} output: {message}")]
    Parse { tool: &'static str, message: String },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VcsError {
    /// Create a NotVersioned error from a path
    pub fn not_versioned(path: &Path) -> Self {
        Self::NotVersioned(path.display().to_string())
    }

    /// Create a Parse error for a tool's output
    pub fn parse(tool: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            tool,
            message: message.into(),
        }
    }
}
