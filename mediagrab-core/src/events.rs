//! Event bus for broadcasting download and update events to observers.
//!
//! Front ends subscribe once and receive every event on their own unbounded
//! channel. Delivery is fire-and-forget: a subscriber whose receiver is gone
//! is dropped from the registry on the next broadcast.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::download::{DownloadStatusPayload, Progress};
use crate::update::UpdateStatusPayload;

// =============================================================================
// Events
// =============================================================================

/// Channel name for progress events.
pub const CHANNEL_PROGRESS: &str = "download:progress";
/// Channel name for download status events.
pub const CHANNEL_DOWNLOAD_STATUS: &str = "download:status";
/// Channel name for update status events.
pub const CHANNEL_UPDATE_STATUS: &str = "update:status";

/// Events broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "channel", content = "payload")]
pub enum AppEvent {
    /// Advisory download progress.
    #[serde(rename = "download:progress")]
    Progress(Progress),

    /// Authoritative download lifecycle change.
    #[serde(rename = "download:status")]
    DownloadStatus(DownloadStatusPayload),

    /// Update lifecycle change.
    #[serde(rename = "update:status")]
    UpdateStatus(UpdateStatusPayload),
}

impl AppEvent {
    /// Returns the channel name this event is published on.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Progress(_) => CHANNEL_PROGRESS,
            Self::DownloadStatus(_) => CHANNEL_DOWNLOAD_STATUS,
            Self::UpdateStatus(_) => CHANNEL_UPDATE_STATUS,
        }
    }
}

// =============================================================================
// Channel Types
// =============================================================================

/// Sender half held by the bus for one subscriber.
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Receiver half owned by a subscriber.
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Identifies a subscriber for explicit unsubscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Registry = HashMap<SubscriberId, EventSender>;

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A panicking subscriber cannot leave the map half-updated.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Event Bus
// =============================================================================

/// Observer registry shared by the orchestrator and the update lifecycle.
///
/// Cloning is cheap; all clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    ///
    /// Dropping the returned `Subscription` unsubscribes it.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriberId(Uuid::new_v4());
        lock(&self.registry).insert(id, tx);
        debug!(subscriber = %id, "Subscriber registered");

        Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Removes a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = lock(&self.registry).remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "Subscriber removed");
        }
        removed
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).len()
    }

    /// Sends `event` to every subscriber.
    pub fn emit(&self, event: AppEvent) {
        let mut registry = lock(&self.registry);
        registry.retain(|id, tx| {
            let delivered = tx.send(event.clone()).is_ok();
            if !delivered {
                debug!(subscriber = %id, "Subscriber receiver dropped, pruning");
            }
            delivered
        });
    }

    pub fn emit_progress(&self, progress: Progress) {
        self.emit(AppEvent::Progress(progress));
    }

    pub fn emit_download_status(&self, payload: DownloadStatusPayload) {
        self.emit(AppEvent::DownloadStatus(payload));
    }

    pub fn emit_update_status(&self, payload: UpdateStatusPayload) {
        self.emit(AppEvent::UpdateStatus(payload));
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A subscriber's handle on the bus.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: EventReceiver,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next event. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drains every queued event.
    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Unsubscribes explicitly.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.id);
        }
    }
}
