//! Native folder dialog.

use std::path::PathBuf;

use async_trait::async_trait;
use mediagrab_core::FolderPicker;

/// Folder picker backed by the platform file dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogFolderPicker;

#[async_trait]
impl FolderPicker for DialogFolderPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_title("Choose a download folder")
            .pick_folder()
            .await
            .map(|f| f.path().to_path_buf())
    }
}
