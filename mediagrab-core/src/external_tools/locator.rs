//! Ordered search for the yt-dlp and ffmpeg executables.
//!
//! Resolution never fails. When no candidate exists on disk the bundled path
//! is returned as-is, so the spawn attempt reports a plain "file not found"
//! that the orchestrator can classify.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{ResolvedTools, ToolKind};
use crate::config::Settings;

/// Name of the directory some ffmpeg archives extract into.
const TRANSCODE_ARCHIVE_DIR: &str = "ffmpeg";

// ============================================================================
// Tool Locator
// ============================================================================

/// Finds the external tools, first match wins:
///
/// 1. `<bundled_dir>/<exe>`
/// 2. `<system_dir>/<exe>`
/// 3. ffmpeg only: `<system_dir>/ffmpeg/<exe>` and `<system_dir>/ffmpeg/bin/<exe>`
/// 4. the bundled path from step 1, unchanged
#[derive(Debug, Clone)]
pub struct ToolLocator {
    bundled_dir: PathBuf,
    system_dir: PathBuf,
}

impl ToolLocator {
    /// Creates a locator over explicit directories.
    pub fn new(bundled_dir: impl Into<PathBuf>, system_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundled_dir: bundled_dir.into(),
            system_dir: system_dir.into(),
        }
    }

    /// Creates a locator for the directories named by `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.bundled_tools_dir(),
            settings.system_tools_dir.clone(),
        )
    }

    /// Returns the bundled tools directory.
    pub fn bundled_dir(&self) -> &Path {
        &self.bundled_dir
    }

    /// Returns the well-known system tools directory.
    pub fn system_dir(&self) -> &Path {
        &self.system_dir
    }

    /// Returns the bundled location of a tool, whether or not it exists.
    pub fn bundled_path(&self, kind: ToolKind) -> PathBuf {
        self.bundled_dir.join(kind.executable_name())
    }

    /// Returns every location checked for `kind`, in search order.
    pub fn candidates(&self, kind: ToolKind) -> Vec<PathBuf> {
        let exe = kind.executable_name();
        let mut candidates = vec![self.bundled_path(kind), self.system_dir.join(&exe)];

        if kind == ToolKind::Transcode {
            let nested = self.system_dir.join(TRANSCODE_ARCHIVE_DIR);
            candidates.push(nested.join(&exe));
            candidates.push(nested.join("bin").join(&exe));
        }

        candidates
    }

    /// Resolves the path for one tool.
    pub fn resolve(&self, kind: ToolKind) -> PathBuf {
        match self.candidates(kind).into_iter().find(|p| p.is_file()) {
            Some(found) => {
                debug!(tool = %kind, path = %found.display(), "Resolved tool");
                found
            }
            None => {
                let guess = self.bundled_path(kind);
                debug!(
                    tool = %kind,
                    path = %guess.display(),
                    "Tool not found in any search location, using bundled path"
                );
                guess
            }
        }
    }

    /// Resolves both tools for one download.
    pub fn resolve_all(&self) -> ResolvedTools {
        ResolvedTools {
            fetch_tool_path: self.resolve(ToolKind::Fetch),
            transcode_tool_path: self.resolve(ToolKind::Transcode),
        }
    }
}
