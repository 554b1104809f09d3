//! Runtime settings for Mediagrab.
//!
//! Settings are assembled in memory from defaults, `MEDIAGRAB_*` environment
//! variables and front-end flags. Nothing here is written back to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::download::{AdmissionPolicy, DownloadFormat, DownloadQuality};
use crate::external_tools::paths;

// =============================================================================
// Runtime Mode
// =============================================================================

/// Whether the application runs from a source checkout or a packaged install.
///
/// Selects the bundled tools layout and disables the update check in
/// development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Running from a checkout (`cargo run`).
    Development,
    /// Running from a packaged install.
    #[default]
    Production,
}

impl RuntimeMode {
    /// Returns true for a packaged install.
    pub fn is_packaged(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Environment Variables
// =============================================================================

/// Set to `1`/`true` to force development mode.
pub const ENV_DEV: &str = "MEDIAGRAB_DEV";
/// Overrides the bundled tools directory.
pub const ENV_TOOLS_DIR: &str = "MEDIAGRAB_TOOLS_DIR";
/// Overrides the well-known system tools directory.
pub const ENV_SYSTEM_TOOLS_DIR: &str = "MEDIAGRAB_SYSTEM_TOOLS_DIR";
/// Default output directory for downloads.
pub const ENV_OUTPUT_DIR: &str = "MEDIAGRAB_OUTPUT_DIR";
/// Admission policy: `reject`, `wait` or `unrestricted`.
pub const ENV_ADMISSION: &str = "MEDIAGRAB_ADMISSION";

// =============================================================================
// Application Settings
// =============================================================================

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Development or packaged runtime.
    pub runtime_mode: RuntimeMode,

    /// Explicit bundled tools directory. Wins over the layout derived from
    /// `runtime_mode`.
    #[serde(default)]
    pub tools_dir: Option<PathBuf>,

    /// Application root used for the development layout (`<app_dir>/tools`).
    pub app_dir: PathBuf,

    /// Resource directory used for the packaged layout (`<resources_dir>/tools`).
    pub resources_dir: PathBuf,

    /// Well-known directory users install the tools into by hand.
    pub system_tools_dir: PathBuf,

    /// Where downloads land when a request names no directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Format used when a request leaves it out.
    pub default_format: DownloadFormat,

    /// Quality used when a request leaves it out.
    pub default_quality: DownloadQuality,

    /// What to do with a submission while another download is in flight.
    pub admission: AdmissionPolicy,

    /// Start downloading an available update without asking.
    pub auto_download_updates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime_mode: RuntimeMode::default(),
            tools_dir: None,
            app_dir: paths::default_app_dir(),
            resources_dir: paths::default_resources_dir(),
            system_tools_dir: paths::default_system_tools_dir(),
            output_dir: None,
            default_format: DownloadFormat::default(),
            default_quality: DownloadQuality::default(),
            admission: AdmissionPolicy::default(),
            auto_download_updates: true,
        }
    }
}

impl Settings {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.overlay_env(|key| std::env::var(key).ok());
        settings.validate();
        settings
    }

    /// Applies `MEDIAGRAB_*` overrides read through `lookup`.
    pub fn overlay_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEV) {
            if is_truthy(&value) {
                self.runtime_mode = RuntimeMode::Development;
            }
        }
        if let Some(dir) = lookup(ENV_TOOLS_DIR) {
            self.tools_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_SYSTEM_TOOLS_DIR) {
            self.system_tools_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(ENV_ADMISSION) {
            match value.parse() {
                Ok(policy) => self.admission = policy,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_ADMISSION),
            }
        }
    }

    /// Normalizes empty values.
    pub fn validate(&mut self) {
        if is_empty_path(self.tools_dir.as_deref()) {
            self.tools_dir = None;
        }
        if is_empty_path(self.output_dir.as_deref()) {
            self.output_dir = None;
        }
        if self.system_tools_dir.as_os_str().is_empty() {
            self.system_tools_dir = paths::default_system_tools_dir();
        }
    }

    /// The directory that holds the bundled tools for this runtime.
    pub fn bundled_tools_dir(&self) -> PathBuf {
        if let Some(dir) = &self.tools_dir {
            return dir.clone();
        }
        paths::bundled_tools_dir(self.runtime_mode, &self.app_dir, &self.resources_dir)
    }

    /// Output directory for requests that do not name one.
    pub fn default_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(paths::default_downloads_dir)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn is_empty_path(path: Option<&Path>) -> bool {
    path.map(|p| p.as_os_str().is_empty()).unwrap_or(false)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.runtime_mode, RuntimeMode::Production);
        assert!(settings.tools_dir.is_none());
        assert!(settings.output_dir.is_none());
        assert_eq!(settings.default_format, DownloadFormat::Video);
        assert_eq!(settings.default_quality, DownloadQuality::Best);
        assert_eq!(settings.admission, AdmissionPolicy::Reject);
        assert!(settings.auto_download_updates);
    }

    #[test]
    fn test_overlay_env_dev_mode() {
        let mut settings = Settings::default();
        settings.overlay_env(lookup_from(&[(ENV_DEV, "true")]));
        assert_eq!(settings.runtime_mode, RuntimeMode::Development);

        let mut settings = Settings::default();
        settings.overlay_env(lookup_from(&[(ENV_DEV, "0")]));
        assert_eq!(settings.runtime_mode, RuntimeMode::Production);
    }

    #[test]
    fn test_overlay_env_dirs() {
        let mut settings = Settings::default();
        settings.overlay_env(lookup_from(&[
            (ENV_TOOLS_DIR, "/opt/mediagrab/tools"),
            (ENV_SYSTEM_TOOLS_DIR, "/srv/tools"),
            (ENV_OUTPUT_DIR, "/data/media"),
        ]));

        assert_eq!(
            settings.tools_dir,
            Some(PathBuf::from("/opt/mediagrab/tools"))
        );
        assert_eq!(settings.system_tools_dir, PathBuf::from("/srv/tools"));
        assert_eq!(settings.default_output_dir(), PathBuf::from("/data/media"));
    }

    #[test]
    fn test_overlay_env_admission() {
        let mut settings = Settings::default();
        settings.overlay_env(lookup_from(&[(ENV_ADMISSION, "wait")]));
        assert_eq!(settings.admission, AdmissionPolicy::Wait);

        settings.overlay_env(lookup_from(&[(ENV_ADMISSION, "sometimes")]));
        assert_eq!(settings.admission, AdmissionPolicy::Wait);
    }

    #[test]
    fn test_validate_clears_empty_paths() {
        let mut settings = Settings::default();
        settings.tools_dir = Some(PathBuf::new());
        settings.output_dir = Some(PathBuf::new());
        settings.system_tools_dir = PathBuf::new();
        settings.validate();

        assert!(settings.tools_dir.is_none());
        assert!(settings.output_dir.is_none());
        assert_eq!(settings.system_tools_dir, paths::default_system_tools_dir());
    }

    #[test]
    fn test_bundled_tools_dir_follows_runtime_mode() {
        let mut settings = Settings::default();
        settings.app_dir = PathBuf::from("/src/mediagrab");
        settings.resources_dir = PathBuf::from("/opt/mediagrab/resources");

        settings.runtime_mode = RuntimeMode::Development;
        assert_eq!(
            settings.bundled_tools_dir(),
            PathBuf::from("/src/mediagrab").join("tools")
        );

        settings.runtime_mode = RuntimeMode::Production;
        assert_eq!(
            settings.bundled_tools_dir(),
            PathBuf::from("/opt/mediagrab/resources").join("tools")
        );

        settings.tools_dir = Some(PathBuf::from("/custom"));
        assert_eq!(settings.bundled_tools_dir(), PathBuf::from("/custom"));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.runtime_mode, settings.runtime_mode);
        assert_eq!(parsed.default_quality, settings.default_quality);
        assert_eq!(parsed.system_tools_dir, settings.system_tools_dir);
    }

    #[test]
    fn test_runtime_mode_display() {
        assert_eq!(RuntimeMode::Development.to_string(), "development");
        assert!(!RuntimeMode::Development.is_packaged());
        assert!(RuntimeMode::Production.is_packaged());
    }
}
