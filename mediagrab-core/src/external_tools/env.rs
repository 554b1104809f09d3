//! Environment helpers for external tool subprocesses.
//!
//! yt-dlp decorates its output for interactive terminals. These helpers keep
//! the child in a plain, line-oriented mode so the progress parser sees
//! predictable text.

use tokio::process::Command;

/// Environment variables applied to every tool subprocess.
const HEADLESS_ENV: &[(&str, &str)] = &[
    ("TERM", "dumb"),
    ("NO_COLOR", "1"),
    ("CLICOLOR", "0"),
    ("PYTHONIOENCODING", "utf-8"),
    ("PYTHONUNBUFFERED", "1"),
];

/// Applies the headless environment to a Command.
pub fn apply_to_command(cmd: &mut Command) {
    for (key, value) in HEADLESS_ENV {
        cmd.env(key, value);
    }
}

/// Hides the console window a tool would otherwise open on Windows.
pub fn hide_console_window(cmd: &mut Command) {
    #[cfg(windows)]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    #[cfg(not(windows))]
    {
        let _ = cmd;
    }
}
