//! Directory conventions for the external tools.
//!
//! The bundled `tools/` directory lives next to the application:
//!
//! - Development: `<app_dir>/tools/` (the checkout root, i.e. the current directory)
//! - Packaged: `<resources_dir>/tools/` (the directory holding the executable)
//!
//! Users who install the tools by hand usually put them in a well-known
//! directory instead:
//!
//! - Windows: `C:\tools\`
//! - Linux/macOS: `/usr/local/bin/`

use std::path::{Path, PathBuf};

use crate::config::RuntimeMode;

/// Name of the bundled tools subdirectory.
const TOOLS_DIR_NAME: &str = "tools";

// ============================================================================
// Path Resolution
// ============================================================================

/// Returns the bundled tools directory for the given runtime.
pub fn bundled_tools_dir(mode: RuntimeMode, app_dir: &Path, resources_dir: &Path) -> PathBuf {
    match mode {
        RuntimeMode::Development => app_dir.join(TOOLS_DIR_NAME),
        RuntimeMode::Production => resources_dir.join(TOOLS_DIR_NAME),
    }
}

/// Returns the application root used in development.
pub fn default_app_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the resources directory of a packaged install.
pub fn default_resources_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(default_app_dir)
}

/// Returns the well-known directory for hand-installed tools.
pub fn default_system_tools_dir() -> PathBuf {
    #[cfg(windows)]
    {
        PathBuf::from("C:\\").join(TOOLS_DIR_NAME)
    }

    #[cfg(not(windows))]
    {
        PathBuf::from("/usr/local/bin")
    }
}

/// Returns the user's Downloads directory.
///
/// Falls back to `~/Downloads`, then to the current directory.
pub fn default_downloads_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(default_app_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_tools_dir_development() {
        let dir = bundled_tools_dir(
            RuntimeMode::Development,
            Path::new("/src/app"),
            Path::new("/opt/app"),
        );
        assert!(dir.starts_with("/src/app"));
        assert!(dir.ends_with("tools"));
    }

    #[test]
    fn test_bundled_tools_dir_production() {
        let dir = bundled_tools_dir(
            RuntimeMode::Production,
            Path::new("/src/app"),
            Path::new("/opt/app"),
        );
        assert!(dir.starts_with("/opt/app"));
        assert!(dir.ends_with("tools"));
    }

    #[test]
    fn test_default_system_tools_dir() {
        let dir = default_system_tools_dir();

        #[cfg(windows)]
        assert!(dir.to_string_lossy().to_lowercase().ends_with("tools"));

        #[cfg(not(windows))]
        assert_eq!(dir, PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_default_dirs_are_not_empty() {
        assert!(!default_app_dir().as_os_str().is_empty());
        assert!(!default_resources_dir().as_os_str().is_empty());
        assert!(!default_downloads_dir().as_os_str().is_empty());
    }
}
