//! Inbound command surface.
//!
//! Front ends call into the core through `CommandHandler` and watch the event
//! bus for everything that happens afterwards.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::download::{DownloadError, DownloadOptions, DownloadOrchestrator};
use crate::events::EventBus;
use crate::update::{UpdateError, UpdateEventReceiver, UpdateLifecycle};

/// Native folder selection.
#[async_trait]
pub trait FolderPicker: Send + Sync {
    /// Returns the chosen folder, or `None` if the user cancelled.
    async fn pick_folder(&self) -> Option<PathBuf>;
}

/// Picker for headless environments. Always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFolderPicker;

#[async_trait]
impl FolderPicker for NoFolderPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        None
    }
}

/// Entry point for front-end commands.
#[derive(Clone)]
pub struct CommandHandler {
    orchestrator: DownloadOrchestrator,
    updates: UpdateLifecycle,
    picker: Arc<dyn FolderPicker>,
}

impl CommandHandler {
    pub fn new(
        orchestrator: DownloadOrchestrator,
        updates: UpdateLifecycle,
        picker: Arc<dyn FolderPicker>,
    ) -> Self {
        Self {
            orchestrator,
            updates,
            picker,
        }
    }

    pub fn bus(&self) -> &EventBus {
        self.orchestrator.bus()
    }

    pub fn orchestrator(&self) -> &DownloadOrchestrator {
        &self.orchestrator
    }

    pub fn updates(&self) -> &UpdateLifecycle {
        &self.updates
    }

    /// Starts a download and resolves once it finishes.
    pub async fn submit_download(&self, options: DownloadOptions) -> Result<String, DownloadError> {
        self.orchestrator.submit(options).await
    }

    /// Asks the user for an output folder.
    pub async fn select_output_folder(&self) -> Option<PathBuf> {
        let folder = self.picker.pick_folder().await;
        match &folder {
            Some(path) => debug!(folder = %path.display(), "Output folder selected"),
            None => debug!("Folder selection cancelled"),
        }
        folder
    }

    /// Runs the start-up update check.
    pub fn start_update_lifecycle(&self, events: UpdateEventReceiver) -> Option<JoinHandle<()>> {
        self.updates.start(events)
    }

    /// Checks for an update on demand.
    pub async fn check_for_update(&self) -> Result<(), UpdateError> {
        self.updates.check_for_update().await
    }

    /// Quits and installs a downloaded update.
    pub fn restart_and_install_update(&self) -> Result<(), UpdateError> {
        self.updates.restart_and_install()
    }
}
