//! Download status and progress payloads.

use serde::{Deserialize, Serialize};

/// Lifecycle of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// No download has been submitted yet.
    #[default]
    Idle,
    /// Accepted, tools being resolved.
    Queued,
    /// The fetch tool is running.
    Downloading,
    /// The fetch tool exited successfully.
    Completed,
    /// Validation, spawn or the tool itself failed.
    Error,
}

impl DownloadStatus {
    /// Returns true while a download holds the process.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Downloading)
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Status broadcast on the `download:status` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DownloadStatusPayload {
    pub status: DownloadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DownloadStatusPayload {
    pub fn new(status: DownloadStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    pub fn queued(message: impl Into<String>) -> Self {
        Self::new(DownloadStatus::Queued, message)
    }

    pub fn downloading(message: impl Into<String>) -> Self {
        Self::new(DownloadStatus::Downloading, message)
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self::new(DownloadStatus::Completed, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DownloadStatus::Error, message)
    }
}

/// Advisory completion percentage broadcast on the `download:progress` channel.
///
/// Values are clamped to `[0, 100]` but may go backwards between events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub percent: f64,
}

impl Progress {
    pub fn new(percent: f64) -> Self {
        Self {
            percent: percent.clamp(0.0, 100.0),
        }
    }

    /// The 100% tick sent after every successful download.
    pub fn complete() -> Self {
        Self { percent: 100.0 }
    }
}
