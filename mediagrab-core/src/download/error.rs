//! Download error types.
//!
//! The `Display` text of every variant is the human-readable message that is
//! broadcast with the `error` status and returned to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can end a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request was rejected before any process was spawned.
    #[error("{0}")]
    Validation(String),

    /// The fetch tool could not be found at spawn time.
    #[error("{message}")]
    ToolNotFound { path: PathBuf, message: String },

    /// Spawning failed for a reason other than a missing executable.
    #[error("{0}")]
    Spawn(String),

    /// The fetch tool exited unsuccessfully.
    #[error("{message}")]
    ProcessExit { code: Option<i32>, message: String },

    /// Another download holds the admission slot.
    #[error("Another download is already in progress.")]
    Busy,

    /// Waiting on the child process failed after it was spawned.
    #[error("Lost track of the download process: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Returns the exit code for `ProcessExit` errors.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessExit { code, .. } => *code,
            _ => None,
        }
    }
}
