//! Terminal rendering of the event stream.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use mediagrab_core::{AppEvent, DownloadStatus, Subscription, UpdateState};
use tokio::sync::oneshot;

/// Draws download progress and status lines.
pub struct Renderer {
    bar: ProgressBar,
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        let bar = if json {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template("{msg:20} [{wide_bar}] {pos:>3}%")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            bar
        };
        Self { bar, json }
    }

    pub fn handle(&self, event: &AppEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
            }
            return;
        }

        match event {
            AppEvent::Progress(progress) => {
                if !self.bar.is_finished() {
                    self.bar.set_position(progress.percent.round() as u64);
                }
            }
            AppEvent::DownloadStatus(payload) => {
                let message = payload.message.clone().unwrap_or_default();
                match payload.status {
                    DownloadStatus::Idle => {}
                    DownloadStatus::Queued | DownloadStatus::Downloading => {
                        self.bar.set_message(message);
                    }
                    DownloadStatus::Completed => {
                        self.bar.set_position(100);
                        self.bar.finish_with_message(message);
                    }
                    DownloadStatus::Error => {
                        self.bar.abandon_with_message("Failed");
                        eprintln!("{message}");
                    }
                }
            }
            AppEvent::UpdateStatus(payload) => match payload.state {
                UpdateState::Available | UpdateState::Downloaded | UpdateState::Error => {
                    if let Some(message) = &payload.message {
                        self.bar.println(format!("update: {message}"));
                    }
                }
                _ => tracing::debug!(state = %payload.state, "Update status"),
            },
        }
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Renders events until `stop` fires, then drains what is left.
pub async fn run(
    mut subscription: Subscription,
    renderer: Renderer,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = subscription.recv() => match event {
                Some(event) => renderer.handle(&event),
                None => break,
            },
            _ = &mut stop => {
                for event in subscription.drain() {
                    renderer.handle(&event);
                }
                break;
            }
        }
    }
    renderer.finish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagrab_core::{DownloadStatusPayload, EventBus, Progress};

    #[test]
    fn test_completed_finishes_bar() {
        let renderer = Renderer::new(false);
        renderer.handle(&AppEvent::DownloadStatus(DownloadStatusPayload::queued("Preparing")));
        renderer.handle(&AppEvent::Progress(Progress::new(42.4)));
        assert_eq!(renderer.bar.position(), 42);

        renderer.handle(&AppEvent::DownloadStatus(DownloadStatusPayload::completed("Done")));
        assert!(renderer.bar.is_finished());
        assert_eq!(renderer.bar.position(), 100);
    }

    #[tokio::test]
    async fn test_run_drains_after_stop() {
        let bus = EventBus::new();
        let subscription = bus.subscribe();
        let (stop_tx, stop_rx) = oneshot::channel();

        bus.emit_download_status(DownloadStatusPayload::completed("Done"));
        bus.emit_progress(Progress::complete());
        stop_tx.send(()).unwrap();

        run(subscription, Renderer::new(true), stop_rx).await;
    }
}
