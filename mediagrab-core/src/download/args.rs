//! yt-dlp invocation builder.
//!
//! Pure mapping from a request and resolved tool paths to the exact argument
//! list. No filesystem access and no environment lookups happen here.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use super::request::{DownloadFormat, DownloadQuality, DownloadRequest};
use crate::external_tools::ResolvedTools;

/// Audio container produced by audio extraction.
const AUDIO_CONTAINER: &str = "mp3";

/// `--audio-quality` value for the best VBR quality.
const BEST_AUDIO_QUALITY: &str = "0";

/// A fully-specified process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub executable: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Returns the value following `flag`, if present.
    pub fn flag_value(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
    }

    /// Returns true if `arg` appears anywhere in the argument list.
    pub fn contains(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Returns the yt-dlp format selector for a video quality tier.
///
/// Every selector is a three-tier chain: mp4 video + m4a audio within the
/// bound, then a single mp4 file within the bound, then anything within the
/// bound.
pub fn format_selector(quality: DownloadQuality) -> String {
    match quality.max_height() {
        Some(height) => format!(
            "bv*[height<={h}][ext=mp4]+ba[ext=m4a]/best[height<={h}][ext=mp4]/best[height<={h}]",
            h = height
        ),
        None => "bv*[ext=mp4]+ba[ext=m4a]/best[ext=mp4]/best".to_string(),
    }
}

/// Builds the yt-dlp invocation for `request`.
pub fn build_invocation(request: &DownloadRequest, tools: &ResolvedTools) -> Invocation {
    let mut args: Vec<OsString> = vec![
        request.url().into(),
        "-o".into(),
        request.output_template().as_os_str().to_owned(),
        "--newline".into(),
        "--no-warnings".into(),
        "--ffmpeg-location".into(),
        tools.transcode_tool_path.as_os_str().to_owned(),
    ];

    match request.format() {
        DownloadFormat::Audio => {
            args.extend(
                [
                    "-x",
                    "--audio-format",
                    AUDIO_CONTAINER,
                    "--audio-quality",
                    BEST_AUDIO_QUALITY,
                ]
                .map(OsString::from),
            );
        }
        DownloadFormat::Video => {
            args.push("-f".into());
            args.push(format_selector(request.quality()).into());
        }
    }

    Invocation {
        executable: tools.fetch_tool_path.clone(),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn tools() -> ResolvedTools {
        ResolvedTools {
            fetch_tool_path: PathBuf::from("/tools/yt-dlp"),
            transcode_tool_path: PathBuf::from("/tools/ffmpeg"),
        }
    }

    fn request(format: DownloadFormat, quality: DownloadQuality) -> DownloadRequest {
        DownloadRequest::new("https://example.com/v", format, quality, "/out").unwrap()
    }

    #[test]
    fn test_base_arguments() {
        let req = request(DownloadFormat::Video, DownloadQuality::Best);
        let inv = build_invocation(&req, &tools());

        assert_eq!(inv.executable, PathBuf::from("/tools/yt-dlp"));
        assert_eq!(inv.args[0], "https://example.com/v");
        assert_eq!(
            inv.flag_value("-o").map(PathBuf::from),
            Some(Path::new("/out").join("%(title)s.%(ext)s"))
        );
        assert!(inv.contains("--newline"));
        assert!(inv.contains("--no-warnings"));
        assert_eq!(
            inv.flag_value("--ffmpeg-location").map(PathBuf::from),
            Some(PathBuf::from("/tools/ffmpeg"))
        );
    }

    #[test]
    fn test_audio_ignores_quality() {
        for quality in DownloadQuality::all() {
            let inv = build_invocation(&request(DownloadFormat::Audio, *quality), &tools());
            assert!(inv.contains("-x"));
            assert_eq!(inv.flag_value("--audio-format").unwrap(), "mp3");
            assert_eq!(inv.flag_value("--audio-quality").unwrap(), "0");
            assert!(!inv.contains("-f"));
        }
    }

    #[test]
    fn test_video_720p_selector() {
        let req = request(DownloadFormat::Video, DownloadQuality::P720);
        let inv = build_invocation(&req, &tools());
        let selector = inv.flag_value("-f").unwrap().to_string_lossy().into_owned();

        let clauses: Vec<&str> = selector.split('/').collect();
        assert_eq!(clauses.len(), 3);
        assert!(clauses[0].contains("height<=720"));
        assert!(clauses[0].contains("ext=mp4"));
        assert!(clauses[1].contains("height<=720"));
        assert_eq!(clauses[2], "best[height<=720]");
        assert!(!inv.contains("-x"));
    }

    #[test]
    fn test_video_1080p_selector() {
        assert_eq!(
            format_selector(DownloadQuality::P1080),
            "bv*[height<=1080][ext=mp4]+ba[ext=m4a]/best[height<=1080][ext=mp4]/best[height<=1080]"
        );
    }

    #[test]
    fn test_video_best_selector() {
        let selector = format_selector(DownloadQuality::Best);
        assert_eq!(selector, "bv*[ext=mp4]+ba[ext=m4a]/best[ext=mp4]/best");
        assert!(!selector.contains("height"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let req = request(DownloadFormat::Video, DownloadQuality::P1080);
        assert_eq!(build_invocation(&req, &tools()), build_invocation(&req, &tools()));
    }

    #[test]
    fn test_display_renders_command_line() {
        let req = request(DownloadFormat::Audio, DownloadQuality::Best);
        let inv = build_invocation(&req, &tools());
        let rendered = inv.to_string();
        assert!(rendered.starts_with("/tools/yt-dlp https://example.com/v -o"));
        assert!(rendered.ends_with("--audio-quality 0"));
    }
}
