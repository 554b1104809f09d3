//! Download requests and the options they are built from.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::DownloadError;
use crate::config::Settings;

/// File name pattern handed to yt-dlp. The placeholders are expanded by the
/// tool, never by us.
pub const OUTPUT_FILE_PATTERN: &str = "%(title)s.%(ext)s";

/// Message used when a request carries no usable URL.
pub const INVALID_URL_MESSAGE: &str = "Invalid URL.";

// =============================================================================
// Format and Quality
// =============================================================================

/// Output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    /// MP4 video with audio.
    #[default]
    #[serde(alias = "mp4")]
    Video,
    /// MP3 audio only.
    #[serde(alias = "mp3")]
    Audio,
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

impl std::str::FromStr for DownloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "mp4" => Ok(Self::Video),
            "audio" | "mp3" => Ok(Self::Audio),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Video quality tier. Ignored for audio downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DownloadQuality {
    /// Best available stream.
    #[default]
    #[serde(rename = "best")]
    Best,
    /// At most 720 lines.
    #[serde(rename = "720p")]
    P720,
    /// At most 1080 lines.
    #[serde(rename = "1080p")]
    P1080,
}

impl DownloadQuality {
    /// Returns all quality tiers.
    pub fn all() -> &'static [DownloadQuality] {
        &[Self::Best, Self::P720, Self::P1080]
    }

    /// Height bound of the tier, if any.
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Self::Best => None,
            Self::P720 => Some(720),
            Self::P1080 => Some(1080),
        }
    }
}

impl fmt::Display for DownloadQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::P720 => write!(f, "720p"),
            Self::P1080 => write!(f, "1080p"),
        }
    }
}

impl std::str::FromStr for DownloadQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "720p" | "720" => Ok(Self::P720),
            "1080p" | "1080" => Ok(Self::P1080),
            _ => Err(format!("Unknown quality: {}", s)),
        }
    }
}

// =============================================================================
// Inbound Options
// =============================================================================

/// Loosely-typed download options as they arrive from a front end.
///
/// Every field is optional; `DownloadRequest::from_options` fills the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadOptions {
    pub url: Option<String>,
    pub format: Option<DownloadFormat>,
    pub quality: Option<DownloadQuality>,
    pub output_dir: Option<PathBuf>,
}

impl DownloadOptions {
    /// Options for a URL with every other field left to defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn format(mut self, format: DownloadFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn quality(mut self, quality: DownloadQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

// =============================================================================
// Download Request
// =============================================================================

/// A validated, immutable download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: String,
    format: DownloadFormat,
    quality: DownloadQuality,
    output_dir: PathBuf,
    output_template: PathBuf,
}

impl DownloadRequest {
    /// Creates a request, trimming the URL.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Validation` if the URL is empty or whitespace.
    pub fn new(
        url: &str,
        format: DownloadFormat,
        quality: DownloadQuality,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, DownloadError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DownloadError::Validation(INVALID_URL_MESSAGE.to_string()));
        }

        let output_dir = output_dir.into();
        let output_template = output_dir.join(OUTPUT_FILE_PATTERN);

        Ok(Self {
            url: url.to_string(),
            format,
            quality,
            output_dir,
            output_template,
        })
    }

    /// Builds a request from front-end options, using `settings` for
    /// anything the options leave out.
    pub fn from_options(
        options: DownloadOptions,
        settings: &Settings,
    ) -> Result<Self, DownloadError> {
        let output_dir = options
            .output_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| settings.default_output_dir());

        Self::new(
            options.url.as_deref().unwrap_or_default(),
            options.format.unwrap_or(settings.default_format),
            options.quality.unwrap_or(settings.default_quality),
            output_dir,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> DownloadFormat {
        self.format
    }

    pub fn quality(&self) -> DownloadQuality {
        self.quality
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/%(title)s.%(ext)s`
    pub fn output_template(&self) -> &Path {
        &self.output_template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_output(dir: &str) -> Settings {
        let mut settings = Settings::default();
        settings.output_dir = Some(PathBuf::from(dir));
        settings
    }

    #[test]
    fn test_new_trims_url() {
        let request = DownloadRequest::new(
            "  https://example.com/watch?v=abc \n",
            DownloadFormat::Video,
            DownloadQuality::Best,
            "/downloads",
        )
        .unwrap();
        assert_eq!(request.url(), "https://example.com/watch?v=abc");
    }

    #[test]
    fn test_blank_url_rejected() {
        for url in ["", "   ", "\t\n"] {
            let result = DownloadRequest::new(
                url,
                DownloadFormat::Video,
                DownloadQuality::Best,
                "/downloads",
            );
            assert!(matches!(result, Err(DownloadError::Validation(_))));
        }
    }

    #[test]
    fn test_output_template() {
        let request = DownloadRequest::new(
            "https://example.com/v",
            DownloadFormat::Audio,
            DownloadQuality::Best,
            "/downloads",
        )
        .unwrap();
        assert_eq!(
            request.output_template(),
            Path::new("/downloads").join("%(title)s.%(ext)s")
        );
    }

    #[test]
    fn test_from_options_applies_defaults() {
        let settings = settings_with_output("/media");
        let request =
            DownloadRequest::from_options(DownloadOptions::new("https://e.com/v"), &settings)
                .unwrap();

        assert_eq!(request.format(), DownloadFormat::Video);
        assert_eq!(request.quality(), DownloadQuality::Best);
        assert_eq!(request.output_dir(), Path::new("/media"));
    }

    #[test]
    fn test_from_options_empty_output_dir_uses_default() {
        let settings = settings_with_output("/media");
        let options = DownloadOptions::new("https://e.com/v").output_dir("");
        let request = DownloadRequest::from_options(options, &settings).unwrap();
        assert_eq!(request.output_dir(), Path::new("/media"));
    }

    #[test]
    fn test_from_options_missing_url_rejected() {
        let settings = Settings::default();
        let result = DownloadRequest::from_options(DownloadOptions::default(), &settings);
        match result {
            Err(DownloadError::Validation(msg)) => assert_eq!(msg, INVALID_URL_MESSAGE),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_options_deserialize_from_front_end_payload() {
        let json = r#"{"url":"https://e.com/v","format":"mp3","quality":"1080p","outputDir":"/tmp/out"}"#;
        let options: DownloadOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.format, Some(DownloadFormat::Audio));
        assert_eq!(options.quality, Some(DownloadQuality::P1080));
        assert_eq!(options.output_dir, Some(PathBuf::from("/tmp/out")));

        let sparse: DownloadOptions = serde_json::from_str(r#"{"url":"x"}"#).unwrap();
        assert!(sparse.format.is_none());
        assert!(sparse.quality.is_none());
    }

    #[test]
    fn test_format_and_quality_parse() {
        assert_eq!("mp4".parse::<DownloadFormat>().unwrap(), DownloadFormat::Video);
        assert_eq!("Audio".parse::<DownloadFormat>().unwrap(), DownloadFormat::Audio);
        assert!("flac".parse::<DownloadFormat>().is_err());

        assert_eq!("720p".parse::<DownloadQuality>().unwrap(), DownloadQuality::P720);
        assert_eq!("1080".parse::<DownloadQuality>().unwrap(), DownloadQuality::P1080);
        assert!("4k".parse::<DownloadQuality>().is_err());

        for quality in DownloadQuality::all() {
            assert_eq!(quality.to_string().parse::<DownloadQuality>().unwrap(), *quality);
        }
    }
}
