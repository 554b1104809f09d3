//! Core types for external tool resolution.
//!
//! Defines the two tools the downloader shells out to and the resolved pair
//! handed to the argument builder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Tool Kinds
// ============================================================================

/// The external executables a download needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// yt-dlp - fetches media from a URL.
    Fetch,
    /// ffmpeg - merges and transcodes streams for the fetch tool.
    Transcode,
}

impl ToolKind {
    /// Returns all tool kinds.
    pub fn all() -> &'static [ToolKind] {
        &[Self::Fetch, Self::Transcode]
    }

    /// Returns the tool's base name without platform suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "yt-dlp",
            Self::Transcode => "ffmpeg",
        }
    }

    /// Returns the platform-specific executable file name.
    ///
    /// - Linux/macOS: `yt-dlp`, `ffmpeg`
    /// - Windows: `yt-dlp.exe`, `ffmpeg.exe`
    pub fn executable_name(&self) -> String {
        format!("{}{}", self.as_str(), std::env::consts::EXE_SUFFIX)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches(".exe") {
            "yt-dlp" | "ytdlp" | "fetch" => Ok(Self::Fetch),
            "ffmpeg" | "transcode" => Ok(Self::Transcode),
            _ => Err(format!("Unknown tool: {}", s)),
        }
    }
}

// ============================================================================
// Resolved Tools
// ============================================================================

/// Absolute paths to both tools for one download.
///
/// Resolved fresh for every request; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    /// Path to yt-dlp.
    pub fetch_tool_path: PathBuf,
    /// Path to ffmpeg.
    pub transcode_tool_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_as_str() {
        assert_eq!(ToolKind::Fetch.as_str(), "yt-dlp");
        assert_eq!(ToolKind::Transcode.as_str(), "ffmpeg");
    }

    #[test]
    fn test_executable_name() {
        #[cfg(windows)]
        {
            assert_eq!(ToolKind::Fetch.executable_name(), "yt-dlp.exe");
            assert_eq!(ToolKind::Transcode.executable_name(), "ffmpeg.exe");
        }

        #[cfg(not(windows))]
        {
            assert_eq!(ToolKind::Fetch.executable_name(), "yt-dlp");
            assert_eq!(ToolKind::Transcode.executable_name(), "ffmpeg");
        }
    }

    #[test]
    fn test_tool_kind_from_str() {
        assert_eq!("yt-dlp".parse::<ToolKind>().unwrap(), ToolKind::Fetch);
        assert_eq!("yt-dlp.exe".parse::<ToolKind>().unwrap(), ToolKind::Fetch);
        assert_eq!("FFmpeg".parse::<ToolKind>().unwrap(), ToolKind::Transcode);
        assert!("pandoc".parse::<ToolKind>().is_err());
    }
}
