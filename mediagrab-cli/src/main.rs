//! Mediagrab terminal front end
//!
//! Downloads one URL with yt-dlp and renders the core's event stream as a
//! progress bar.

mod picker;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use mediagrab_core::{
    update_event_channel, CommandHandler, DownloadFormat, DownloadOptions, DownloadOrchestrator,
    DownloadQuality, EventBus, FolderPicker, NoFolderPicker, NoopUpdateChannel, RuntimeMode,
    Settings, UpdateLifecycle,
};
use tokio::sync::oneshot;

#[derive(Debug, Parser)]
#[command(name = "mediagrab", version)]
#[command(about = "Download video or audio with yt-dlp and ffmpeg")]
struct Cli {
    /// Media URL to download
    url: String,

    /// Output kind: video (mp4) or audio (mp3)
    #[arg(short, long)]
    format: Option<DownloadFormat>,

    /// Video quality: best, 720p or 1080p
    #[arg(short, long)]
    quality: Option<DownloadQuality>,

    /// Directory the file is saved into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Choose the output directory with a native folder dialog
    #[arg(long, default_value_t = false, conflicts_with = "output_dir")]
    pick_folder: bool,

    /// Directory holding the bundled yt-dlp and ffmpeg
    #[arg(long)]
    tools_dir: Option<PathBuf>,

    /// Fallback directory for manually installed tools
    #[arg(long)]
    system_tools_dir: Option<PathBuf>,

    /// Run in development mode (tools from ./tools, no update check)
    #[arg(long, default_value_t = false)]
    dev: bool,

    /// Print events as JSON lines instead of a progress bar
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    /// Overlays command-line flags on `settings`.
    fn apply(&self, settings: &mut Settings) {
        if self.dev {
            settings.runtime_mode = RuntimeMode::Development;
        }
        if let Some(dir) = &self.tools_dir {
            settings.tools_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.system_tools_dir {
            settings.system_tools_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = Some(dir.clone());
        }
        if let Some(format) = self.format {
            settings.default_format = format;
        }
        if let Some(quality) = self.quality {
            settings.default_quality = quality;
        }
        settings.validate();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::info!("Starting Mediagrab v{}", mediagrab_core::VERSION);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if verbose {
        for directive in ["mediagrab=debug", "mediagrab_core=debug"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    } else {
        filter = filter.add_directive(tracing::Level::WARN.into());
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::from_env();
    cli.apply(&mut settings);
    tracing::debug!(
        mode = %settings.runtime_mode,
        tools_dir = %settings.bundled_tools_dir().display(),
        "Settings resolved"
    );

    let bus = EventBus::new();
    let subscription = bus.subscribe();

    let picker: Arc<dyn FolderPicker> = if cli.pick_folder {
        Arc::new(picker::DialogFolderPicker)
    } else {
        Arc::new(NoFolderPicker)
    };

    let (update_tx, update_rx) = update_event_channel();
    let updates = UpdateLifecycle::new(
        Arc::new(NoopUpdateChannel::new(update_tx)),
        bus.clone(),
        &settings,
    );
    let orchestrator = DownloadOrchestrator::new(settings.clone(), bus);
    let handler = CommandHandler::new(orchestrator, updates, picker);

    let (stop_tx, stop_rx) = oneshot::channel();
    let renderer = tokio::spawn(render::run(
        subscription,
        render::Renderer::new(cli.json),
        stop_rx,
    ));
    let update_listener = handler.start_update_lifecycle(update_rx);

    let output_dir = if cli.pick_folder {
        match handler.select_output_folder().await {
            Some(dir) => dir,
            None => bail!("No output folder selected"),
        }
    } else {
        settings.default_output_dir()
    };
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let options = DownloadOptions::new(cli.url.as_str())
        .format(settings.default_format)
        .quality(settings.default_quality)
        .output_dir(output_dir);
    let result = handler.submit_download(options).await;

    // Every event for this download has been emitted by now.
    let _ = stop_tx.send(());
    renderer.await.context("Renderer task panicked")?;
    if let Some(listener) = update_listener {
        listener.abort();
    }

    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!(error = %e, "Download failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["mediagrab", "https://example.com/v"]).unwrap();
        assert_eq!(cli.url, "https://example.com/v");
        assert!(cli.format.is_none());
        assert!(!cli.pick_folder);
        assert!(!cli.dev);
    }

    #[test]
    fn test_parse_format_and_quality() {
        let cli = Cli::try_parse_from([
            "mediagrab",
            "https://example.com/v",
            "--format",
            "mp3",
            "--quality",
            "720p",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(DownloadFormat::Audio));
        assert_eq!(cli.quality, Some(DownloadQuality::P720));

        assert!(Cli::try_parse_from(["mediagrab", "x", "--quality", "4k"]).is_err());
    }

    #[test]
    fn test_pick_folder_conflicts_with_output_dir() {
        let result = Cli::try_parse_from([
            "mediagrab",
            "https://example.com/v",
            "--pick-folder",
            "--output-dir",
            "/tmp",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_overlay_settings() {
        let cli = Cli::try_parse_from([
            "mediagrab",
            "https://example.com/v",
            "--dev",
            "--tools-dir",
            "/opt/tools",
            "--system-tools-dir",
            "/srv/bin",
            "--output-dir",
            "/media",
            "-f",
            "audio",
        ])
        .unwrap();

        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.runtime_mode, RuntimeMode::Development);
        assert_eq!(settings.bundled_tools_dir(), PathBuf::from("/opt/tools"));
        assert_eq!(settings.system_tools_dir, PathBuf::from("/srv/bin"));
        assert_eq!(settings.default_output_dir(), PathBuf::from("/media"));
        assert_eq!(settings.default_format, DownloadFormat::Audio);
        assert_eq!(settings.default_quality, DownloadQuality::Best);
    }
}
