//! Mediagrab Core Library
//!
//! This crate provides the download orchestration behind Mediagrab, a front
//! end for yt-dlp and ffmpeg. It includes:
//!
//! - Runtime settings and environment overrides
//! - Location of the bundled or system-installed external tools
//! - yt-dlp argument construction from a download request
//! - Process supervision with streaming progress parsing
//! - An event bus that broadcasts progress and status to front ends
//! - The application update lifecycle
//! - The command surface front ends call into

pub mod commands;
pub mod config;
pub mod download;
pub mod events;
pub mod external_tools;
pub mod update;

// Re-exports for convenience
pub use config::{RuntimeMode, Settings};

// Re-export commands
pub use commands::{CommandHandler, FolderPicker, NoFolderPicker};

// Re-export download
pub use download::{
    AdmissionPolicy, DownloadError, DownloadFormat, DownloadOptions, DownloadOrchestrator,
    DownloadQuality, DownloadRequest, DownloadStatus, DownloadStatusPayload, Progress,
};

// Re-export events
pub use events::{AppEvent, EventBus, Subscription};

// Re-export tool resolution
pub use external_tools::{ResolvedTools, ToolKind, ToolLocator};

// Re-export updates
pub use update::{
    update_event_channel, NoopUpdateChannel, UpdateChannel, UpdateChannelError,
    UpdateChannelEvent, UpdateError, UpdateLifecycle, UpdateState, UpdateStatusPayload,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
