//! External tool resolution.
//!
//! Mediagrab drives two third-party executables: yt-dlp fetches the media and
//! ffmpeg merges or transcodes the streams. Neither is linked in; both are
//! located on disk for every download.
//!
//! # Architecture
//!
//! - `types`: Tool kinds and the resolved path pair
//! - `paths`: Bundled, system and downloads directory conventions
//! - `locator`: Ordered search with a never-failing fallback
//! - `env`: Environment setup for tool subprocesses
//!
//! # Example
//!
//! ```ignore
//! use mediagrab_core::external_tools::{ToolKind, ToolLocator};
//!
//! let locator = ToolLocator::from_settings(&settings);
//! let yt_dlp = locator.resolve(ToolKind::Fetch);
//! println!("yt-dlp at: {}", yt_dlp.display());
//! ```

pub mod env;
pub mod locator;
pub mod paths;
pub mod types;

pub use env::{apply_to_command, hide_console_window};
pub use locator::ToolLocator;
pub use paths::{
    bundled_tools_dir, default_app_dir, default_downloads_dir, default_resources_dir,
    default_system_tools_dir,
};
pub use types::{ResolvedTools, ToolKind};
