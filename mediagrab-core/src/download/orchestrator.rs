//! Download supervision.
//!
//! The orchestrator drives one yt-dlp process per download: it resolves the
//! tools, spawns the child, feeds both output streams through the progress
//! parser and classifies the exit. Every status transition is broadcast on
//! the event bus before the call returns.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::admission::AdmissionGate;
use super::args::{build_invocation, Invocation};
use super::error::DownloadError;
use super::progress::ProgressParser;
use super::request::{DownloadOptions, DownloadRequest};
use super::status::{DownloadStatus, DownloadStatusPayload, Progress};
use crate::config::Settings;
use crate::events::EventBus;
use crate::external_tools::{self, ToolLocator};

pub const QUEUED_MESSAGE: &str = "Preparing download...";
pub const DOWNLOADING_MESSAGE: &str = "Downloading...";
pub const COMPLETED_MESSAGE: &str = "Download complete.";

/// Message for a fetch tool that does not exist where it was expected.
pub fn tool_not_found_message(tools_dir: &Path) -> String {
    format!(
        "Could not find yt-dlp or ffmpeg. Make sure {} contains both executables.",
        tools_dir.display()
    )
}

/// Message for a failed run that left nothing on stderr.
pub fn generic_failure_message(tools_dir: &Path) -> String {
    format!(
        "Download failed. Please try again or check that yt-dlp and ffmpeg are installed in {}.",
        tools_dir.display()
    )
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Supervises downloads and broadcasts their lifecycle.
///
/// Clones share the admission slot and the current status.
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    bus: EventBus,
    settings: Arc<Settings>,
    locator: ToolLocator,
    gate: AdmissionGate,
    status: Arc<Mutex<DownloadStatus>>,
}

impl DownloadOrchestrator {
    /// Creates an orchestrator that locates tools from `settings`.
    pub fn new(settings: Settings, bus: EventBus) -> Self {
        let locator = ToolLocator::from_settings(&settings);
        let gate = AdmissionGate::new(settings.admission);
        Self {
            bus,
            settings: Arc::new(settings),
            locator,
            gate,
            status: Arc::new(Mutex::new(DownloadStatus::Idle)),
        }
    }

    /// Replaces the tool locator.
    pub fn with_locator(mut self, locator: ToolLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn locator(&self) -> &ToolLocator {
        &self.locator
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Status of the most recent download.
    ///
    /// A rejected submission does not replace the status of a download that
    /// is still queued or downloading.
    pub fn current_status(&self) -> DownloadStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validates front-end options and runs the download.
    ///
    /// Resolves with the completion message. A validation failure is
    /// broadcast once and nothing is spawned.
    pub async fn submit(&self, options: DownloadOptions) -> Result<String, DownloadError> {
        match DownloadRequest::from_options(options, &self.settings) {
            Ok(request) => self.run(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected download request");
                let payload = DownloadStatusPayload::error(e.to_string());
                if self.current_status().is_active() {
                    self.bus.emit_download_status(payload);
                } else {
                    self.transition(payload);
                }
                Err(e)
            }
        }
    }

    /// Runs an already validated request to completion.
    pub async fn run(&self, request: DownloadRequest) -> Result<String, DownloadError> {
        let _ticket = self.gate.admit().await.inspect_err(|_| {
            info!(url = %request.url(), "Download rejected, another one is in flight");
        })?;

        let download_id = Uuid::new_v4();
        let span = info_span!("download", %download_id);
        self.execute(&request).instrument(span).await
    }

    async fn execute(&self, request: &DownloadRequest) -> Result<String, DownloadError> {
        info!(
            url = %request.url(),
            format = %request.format(),
            quality = %request.quality(),
            output_dir = %request.output_dir().display(),
            "Download queued"
        );
        self.transition(DownloadStatusPayload::queued(QUEUED_MESSAGE));

        let tools = self.locator.resolve_all();
        let invocation = build_invocation(request, &tools);
        debug!(command = %invocation, "Spawning fetch tool");

        let mut child = match self.spawn(&invocation) {
            Ok(child) => child,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(DownloadStatusPayload::downloading(DOWNLOADING_MESSAGE));

        let exit = match self.supervise(&mut child).await {
            Ok(exit) => exit,
            Err(e) => return Err(self.fail(e)),
        };

        if exit.status.success() {
            info!("Download completed");
            self.transition(DownloadStatusPayload::completed(COMPLETED_MESSAGE));
            self.bus.emit_progress(Progress::complete());
            return Ok(COMPLETED_MESSAGE.to_string());
        }

        let message = exit
            .last_stderr
            .unwrap_or_else(|| generic_failure_message(self.locator.bundled_dir()));
        Err(self.fail(DownloadError::ProcessExit {
            code: exit.status.code(),
            message,
        }))
    }

    fn spawn(&self, invocation: &Invocation) -> Result<Child, DownloadError> {
        let mut cmd = Command::new(&invocation.executable);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        external_tools::apply_to_command(&mut cmd);
        external_tools::hide_console_window(&mut cmd);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DownloadError::ToolNotFound {
                    path: invocation.executable.clone(),
                    message: tool_not_found_message(self.locator.bundled_dir()),
                }
            } else {
                DownloadError::Spawn(e.to_string())
            }
        })
    }

    /// Pumps both streams until EOF, then reaps the child.
    async fn supervise(&self, child: &mut Child) -> Result<ChildExit, DownloadError> {
        let parser = ProgressParser::new();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (_, last_stderr) = tokio::join!(
            pump(stdout, StreamKind::Stdout, &parser, &self.bus),
            pump(stderr, StreamKind::Stderr, &parser, &self.bus),
        );

        let status = child.wait().await?;
        Ok(ChildExit {
            status,
            last_stderr,
        })
    }

    fn fail(&self, error: DownloadError) -> DownloadError {
        warn!(error = %error, exit_code = ?error.exit_code(), "Download failed");
        self.transition(DownloadStatusPayload::error(error.to_string()));
        error
    }

    fn transition(&self, payload: DownloadStatusPayload) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = payload.status;
        self.bus.emit_download_status(payload);
    }
}

// =============================================================================
// Stream Pumps
// =============================================================================

struct ChildExit {
    status: ExitStatus,
    last_stderr: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamKind {
    Stdout,
    Stderr,
}

/// Reads `stream` line by line, broadcasting progress as it goes.
///
/// Returns the last non-empty stderr line. Read errors end the pump; the
/// exit status still decides the outcome.
async fn pump<R>(
    stream: Option<R>,
    kind: StreamKind,
    parser: &ProgressParser,
    bus: &EventBus,
) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    let stream = stream?;
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut last_line = None;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                for progress in parser.parse(&text) {
                    bus.emit_progress(progress);
                }
                if kind == StreamKind::Stderr {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        debug!(stderr = %trimmed, "Fetch tool diagnostic");
                        last_line = Some(trimmed.to_string());
                    }
                }
            }
            Err(e) => {
                warn!(stream = ?kind, error = %e, "Failed to read fetch tool output");
                break;
            }
        }
    }

    last_line
}

// =============================================================================
// Tests
// =============================================================================
