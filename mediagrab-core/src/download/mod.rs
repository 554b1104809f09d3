//! Download orchestration.
//!
//! # Architecture
//!
//! - `request`: Front-end options and the validated request
//! - `args`: yt-dlp argument construction
//! - `progress`: Progress extraction from tool output
//! - `status`: Status and progress payloads
//! - `admission`: Single-slot admission gate
//! - `orchestrator`: Process supervision and status broadcasting
//! - `error`: Error types

mod admission;
mod args;
mod error;
mod orchestrator;
mod progress;
mod request;
mod status;

pub use admission::{AdmissionGate, AdmissionPolicy, AdmissionTicket};
pub use args::{build_invocation, format_selector, Invocation};
pub use error::DownloadError;
pub use orchestrator::{
    generic_failure_message, tool_not_found_message, DownloadOrchestrator, COMPLETED_MESSAGE,
    DOWNLOADING_MESSAGE, QUEUED_MESSAGE,
};
pub use progress::ProgressParser;
pub use request::{
    DownloadFormat, DownloadOptions, DownloadQuality, DownloadRequest, INVALID_URL_MESSAGE,
    OUTPUT_FILE_PATTERN,
};
pub use status::{DownloadStatus, DownloadStatusPayload, Progress};
