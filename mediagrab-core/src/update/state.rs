//! Update lifecycle states and the payload broadcast on `update:status`.

use serde::{Deserialize, Serialize};

/// Where the application is in the update lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateState {
    #[default]
    Idle,
    Checking,
    Available,
    NotAvailable,
    Downloading,
    Downloaded,
    Error,
}

impl std::fmt::Display for UpdateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Available => "available",
            Self::NotAvailable => "not-available",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Update status broadcast to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UpdateStatusPayload {
    pub state: UpdateState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl UpdateStatusPayload {
    pub fn new(state: UpdateState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: Some(message.into()),
            percent: None,
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_percent(mut self, percent: f64) -> Self {
        self.percent = Some(percent);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wire_names() {
        let json = serde_json::to_string(&UpdateState::NotAvailable).unwrap();
        assert_eq!(json, r#""not-available""#);
        assert_eq!(UpdateState::NotAvailable.to_string(), "not-available");

        let parsed: UpdateState = serde_json::from_str(r#""downloaded""#).unwrap();
        assert_eq!(parsed, UpdateState::Downloaded);
    }

    #[test]
    fn test_payload_omits_empty_fields() {
        let payload = UpdateStatusPayload::new(UpdateState::Checking, "Checking");
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"state":"checking","message":"Checking"}"#
        );

        let payload = UpdateStatusPayload::new(UpdateState::Downloading, "50%")
            .with_percent(50.0)
            .with_version("1.2.0");
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""percent":50.0"#));
        assert!(json.contains(r#""version":"1.2.0""#));
    }
}
