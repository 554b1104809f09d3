//! Update transport seam.
//!
//! The transport (release feed, installer) lives outside the core. It is
//! driven through `UpdateChannel` and reports back by pushing
//! `UpdateChannelEvent`s into the sender it was built with.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Events pushed by an update transport.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateChannelEvent {
    CheckingForUpdate,
    UpdateAvailable { version: String },
    UpdateNotAvailable,
    DownloadProgress { percent: f64 },
    UpdateDownloaded { version: String },
    Error(String),
}

/// Sender handed to the transport.
pub type UpdateEventSender = mpsc::UnboundedSender<UpdateChannelEvent>;

/// Receiver consumed by the update lifecycle.
pub type UpdateEventReceiver = mpsc::UnboundedReceiver<UpdateChannelEvent>;

/// Create a channel for transport events.
pub fn update_event_channel() -> (UpdateEventSender, UpdateEventReceiver) {
    mpsc::unbounded_channel()
}

/// Errors returned by an update transport.
#[derive(Debug, Error)]
pub enum UpdateChannelError {
    #[error("Update check failed: {0}")]
    Check(String),

    #[error("Update download failed: {0}")]
    Download(String),

    #[error("Install failed: {0}")]
    Install(String),
}

/// An update transport.
#[async_trait]
pub trait UpdateChannel: Send + Sync {
    /// Starts one update check. Results arrive as events.
    async fn check_for_updates(&self) -> Result<(), UpdateChannelError>;

    /// Downloads the update announced by the last check.
    async fn download_update(&self) -> Result<(), UpdateChannelError>;

    /// Quits the application and installs the downloaded update.
    fn quit_and_install(&self) -> Result<(), UpdateChannelError>;
}

/// Transport for builds without an update feed. Every check reports that
/// the running version is the latest.
#[derive(Debug, Clone)]
pub struct NoopUpdateChannel {
    events: UpdateEventSender,
}

impl NoopUpdateChannel {
    pub fn new(events: UpdateEventSender) -> Self {
        Self { events }
    }
}

#[async_trait]
impl UpdateChannel for NoopUpdateChannel {
    async fn check_for_updates(&self) -> Result<(), UpdateChannelError> {
        // A closed receiver only means nobody is listening any more.
        let _ = self.events.send(UpdateChannelEvent::CheckingForUpdate);
        let _ = self.events.send(UpdateChannelEvent::UpdateNotAvailable);
        Ok(())
    }

    async fn download_update(&self) -> Result<(), UpdateChannelError> {
        Err(UpdateChannelError::Download("no update feed configured".to_string()))
    }

    fn quit_and_install(&self) -> Result<(), UpdateChannelError> {
        Err(UpdateChannelError::Install("no update feed configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_channel_reports_latest() {
        let (tx, mut rx) = update_event_channel();
        let channel = NoopUpdateChannel::new(tx);

        channel.check_for_updates().await.unwrap();

        assert_eq!(rx.recv().await, Some(UpdateChannelEvent::CheckingForUpdate));
        assert_eq!(rx.recv().await, Some(UpdateChannelEvent::UpdateNotAvailable));
    }

    #[tokio::test]
    async fn test_noop_channel_has_nothing_to_install() {
        let (tx, _rx) = update_event_channel();
        let channel = NoopUpdateChannel::new(tx);

        assert!(channel.download_update().await.is_err());
        assert!(channel.quit_and_install().is_err());
    }

    #[tokio::test]
    async fn test_noop_channel_without_listener() {
        let (tx, rx) = update_event_channel();
        drop(rx);
        let channel = NoopUpdateChannel::new(tx);
        assert!(channel.check_for_updates().await.is_ok());
    }
}
