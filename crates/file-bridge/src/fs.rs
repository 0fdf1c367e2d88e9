//! Filesystem helpers

use pipeline_core::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write `contents` so that readers see either the old file or the whole new one.
///
/// The data goes to a hidden sibling first and is renamed into place.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let staging = staging_path(path);

    fs::write(&staging, contents)
        .await
        .map_err(|e| PipelineError::Io(format!("Failed to write {}: {}", staging.display(), e)))?;

    if let Err(e) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(PipelineError::Io(format!(
            "Failed to move {} into place: {}",
            path.display(),
            e
        )));
    }

    Ok(())
}
