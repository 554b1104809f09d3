//! Single-slot admission gate for downloads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::error::DownloadError;

/// What happens to a submission while another download is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionPolicy {
    /// Fail fast with `DownloadError::Busy`.
    #[default]
    Reject,
    /// Wait for the running download to finish.
    Wait,
    /// No coordination; every submission spawns its own process.
    Unrestricted,
}

impl std::str::FromStr for AdmissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "wait" | "queue" => Ok(Self::Wait),
            "unrestricted" | "none" => Ok(Self::Unrestricted),
            _ => Err(format!("Unknown admission policy: {}", s)),
        }
    }
}

/// Proof of admission. The slot is released when this is dropped.
#[derive(Debug)]
pub struct AdmissionTicket {
    _permit: Option<OwnedSemaphorePermit>,
}

/// Enforces the admission policy across clones of the orchestrator.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    policy: AdmissionPolicy,
    slot: Arc<Semaphore>,
}

impl AdmissionGate {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            policy,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Returns true while a download holds the slot.
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Admits one download according to the policy.
    pub async fn admit(&self) -> Result<AdmissionTicket, DownloadError> {
        let permit = match self.policy {
            AdmissionPolicy::Reject => Some(
                Arc::clone(&self.slot)
                    .try_acquire_owned()
                    .map_err(|_| DownloadError::Busy)?,
            ),
            AdmissionPolicy::Wait => {
                if self.is_busy() {
                    debug!("Download in flight, waiting for the slot");
                }
                Some(
                    Arc::clone(&self.slot)
                        .acquire_owned()
                        .await
                        .map_err(|_| DownloadError::Busy)?,
                )
            }
            AdmissionPolicy::Unrestricted => None,
        };

        Ok(AdmissionTicket { _permit: permit })
    }
}
