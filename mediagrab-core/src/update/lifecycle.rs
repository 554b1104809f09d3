//! Update state machine.
//!
//! `idle -> checking -> available | not-available -> downloading -> downloaded`,
//! with `error` reachable from anywhere. Transport failures are logged with
//! their detail; observers only ever see a generic message.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::channel::{UpdateChannel, UpdateChannelError, UpdateChannelEvent, UpdateEventReceiver};
use super::state::{UpdateState, UpdateStatusPayload};
use crate::config::{RuntimeMode, Settings};
use crate::events::EventBus;

pub const DEV_MODE_MESSAGE: &str = "Development mode, auto-update disabled.";
pub const CHECKING_MESSAGE: &str = "Checking for updates...";
pub const NOT_AVAILABLE_MESSAGE: &str = "You are running the latest version.";
pub const DOWNLOADED_MESSAGE: &str =
    "Update downloaded. It will be installed when the app restarts.";
pub const UPDATE_FAILED_MESSAGE: &str = "Update failed. Please try again later.";

/// Errors returned by update commands.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Channel(#[from] UpdateChannelError),

    #[error("No downloaded update is ready to install")]
    NotReady,
}

/// Drives an `UpdateChannel` and broadcasts its progress.
#[derive(Clone)]
pub struct UpdateLifecycle {
    bus: EventBus,
    channel: Arc<dyn UpdateChannel>,
    mode: RuntimeMode,
    auto_download: bool,
    status: Arc<Mutex<UpdateStatusPayload>>,
}

impl std::fmt::Debug for UpdateLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateLifecycle")
            .field("mode", &self.mode)
            .field("auto_download", &self.auto_download)
            .field("state", &self.state())
            .finish()
    }
}

impl UpdateLifecycle {
    pub fn new(channel: Arc<dyn UpdateChannel>, bus: EventBus, settings: &Settings) -> Self {
        Self {
            bus,
            channel,
            mode: settings.runtime_mode,
            auto_download: settings.auto_download_updates,
            status: Arc::new(Mutex::new(UpdateStatusPayload::default())),
        }
    }

    /// Current state.
    pub fn state(&self) -> UpdateState {
        self.status().state
    }

    /// Last broadcast payload.
    pub fn status(&self) -> UpdateStatusPayload {
        self.status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Starts listening to the transport and runs the start-up check.
    ///
    /// In development mode this broadcasts `idle` once and returns `None`;
    /// transport events are ignored.
    pub fn start(&self, events: UpdateEventReceiver) -> Option<JoinHandle<()>> {
        if !self.mode.is_packaged() {
            info!("Development mode, skipping update check");
            self.publish(UpdateStatusPayload::new(UpdateState::Idle, DEV_MODE_MESSAGE));
            return None;
        }

        let listener = self.clone();
        let handle = tokio::spawn(async move { listener.listen(events).await });

        let checker = self.clone();
        tokio::spawn(async move {
            // Failure is already broadcast and logged.
            let _ = checker.check_for_update().await;
        });

        Some(handle)
    }

    /// Asks the transport for an update.
    pub async fn check_for_update(&self) -> Result<(), UpdateError> {
        if !self.mode.is_packaged() {
            self.publish(UpdateStatusPayload::new(UpdateState::Idle, DEV_MODE_MESSAGE));
            return Ok(());
        }

        debug!("Checking for updates");
        self.channel
            .check_for_updates()
            .await
            .map_err(|e| self.channel_failed(e))
    }

    /// Downloads the announced update.
    pub async fn download_update(&self) -> Result<(), UpdateError> {
        debug!("Downloading update");
        self.channel
            .download_update()
            .await
            .map_err(|e| self.channel_failed(e))
    }

    /// Quits and installs. Only allowed once an update is downloaded.
    pub fn restart_and_install(&self) -> Result<(), UpdateError> {
        if self.state() != UpdateState::Downloaded {
            return Err(UpdateError::NotReady);
        }
        info!("Restarting to install update");
        self.channel
            .quit_and_install()
            .map_err(|e| self.channel_failed(e))
    }

    async fn listen(self, mut events: UpdateEventReceiver) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("Update channel closed");
    }

    /// Applies one transport event.
    pub fn handle_event(&self, event: UpdateChannelEvent) {
        if !self.mode.is_packaged() {
            return;
        }

        match event {
            UpdateChannelEvent::CheckingForUpdate => {
                self.publish(UpdateStatusPayload::new(UpdateState::Checking, CHECKING_MESSAGE));
            }
            UpdateChannelEvent::UpdateAvailable { version } => {
                info!(%version, "Update available");
                let message = if self.auto_download {
                    format!("Found update {}. Downloading...", version)
                } else {
                    format!("Update {} is available.", version)
                };
                self.publish(
                    UpdateStatusPayload::new(UpdateState::Available, message).with_version(version),
                );

                if self.auto_download {
                    let lifecycle = self.clone();
                    tokio::spawn(async move {
                        let _ = lifecycle.download_update().await;
                    });
                }
            }
            UpdateChannelEvent::UpdateNotAvailable => {
                self.publish(UpdateStatusPayload::new(
                    UpdateState::NotAvailable,
                    NOT_AVAILABLE_MESSAGE,
                ));
            }
            UpdateChannelEvent::DownloadProgress { percent } => {
                let percent = percent.clamp(0.0, 100.0);
                let message = format!("Downloading update ({:.1}%)...", percent);
                let mut payload = UpdateStatusPayload::new(UpdateState::Downloading, message)
                    .with_percent(percent);
                payload.version = self.status().version;
                self.publish(payload);
            }
            UpdateChannelEvent::UpdateDownloaded { version } => {
                info!(%version, "Update downloaded");
                self.publish(
                    UpdateStatusPayload::new(UpdateState::Downloaded, DOWNLOADED_MESSAGE)
                        .with_version(version),
                );
            }
            UpdateChannelEvent::Error(detail) => {
                warn!(error = %detail, "Update transport reported an error");
                self.publish(UpdateStatusPayload::new(UpdateState::Error, UPDATE_FAILED_MESSAGE));
            }
        }
    }

    fn channel_failed(&self, error: UpdateChannelError) -> UpdateError {
        warn!(error = %error, "Update channel call failed");
        self.publish(UpdateStatusPayload::new(UpdateState::Error, UPDATE_FAILED_MESSAGE));
        UpdateError::Channel(error)
    }

    fn publish(&self, payload: UpdateStatusPayload) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = payload.clone();
        self.bus.emit_update_status(payload);
    }
}
