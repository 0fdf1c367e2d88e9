//! Sidecar metadata writer

use file_bridge::write_atomic;
use pipeline_core::{
    ExportConfig, ExportMetadata, PipelineError, Result, SceneObjectStats, sidecar_path,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Writes the JSON sidecar for an exported FBX.
///
/// Only call this after the export itself succeeded; a sidecar next to a
/// missing or stale FBX would be trusted by the import script.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportMetadataWriter;

impl ExportMetadataWriter {
    pub fn new() -> Self {
        Self
    }

    /// Build and persist the sidecar, returning it with its path
    pub async fn create_metadata(
        &self,
        asset_name: &str,
        stats: SceneObjectStats,
        export_path: &Path,
        config: &ExportConfig,
    ) -> Result<(ExportMetadata, PathBuf)> {
        self.create_metadata_with_audit(asset_name, stats, export_path, config, None)
            .await
    }

    /// Same as [`create_metadata`](Self::create_metadata), recording a texture audit
    pub async fn create_metadata_with_audit(
        &self,
        asset_name: &str,
        stats: SceneObjectStats,
        export_path: &Path,
        config: &ExportConfig,
        texture_issues: Option<Vec<String>>,
    ) -> Result<(ExportMetadata, PathBuf)> {
        let config = ExportConfig {
            export_path: export_path.to_path_buf(),
            ..config.clone()
        };
        let mut metadata = ExportMetadata::new(asset_name, stats, &config);
        if let Some(issues) = texture_issues {
            metadata = metadata.with_texture_issues(issues);
        }

        // Fully serialized before anything touches the disk.
        let json = metadata.to_json()?;
        let path = sidecar_path(export_path);
        write_atomic(&path, json.as_bytes()).await?;

        info!(
            "Metadata saved: {} ({} polygons, {})",
            path.display(),
            metadata.geometry.polygons,
            metadata.complexity
        );
        Ok((metadata, path))
    }

    /// Read a sidecar back
    pub async fn read_metadata(&self, path: &Path) -> Result<ExportMetadata> {
        let json = fs::read_to_string(path).await.map_err(|e| {
            PipelineError::Io(format!("Failed to read sidecar {}: {}", path.display(), e))
        })?;
        ExportMetadata::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::ComplexityTier;

    #[tokio::test]
    async fn test_sidecar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let export_path = dir.path().join("Table01.fbx");
        let config = ExportConfig::new(&export_path).with_lods(true);
        let stats = SceneObjectStats::new(45_000, 23_000);
        let writer = ExportMetadataWriter::new();

        let (metadata, path) = writer
            .create_metadata("Table01", stats, &export_path, &config)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("Table01.json"));
        assert_eq!(metadata.complexity, ComplexityTier::Medium);

        let read_back = writer.read_metadata(&path).await.unwrap();
        assert_eq!(read_back.geometry.polygons, stats.polygons);
        assert_eq!(read_back.geometry.vertices, stats.vertices);
        assert_eq!(read_back, metadata);
    }

    #[tokio::test]
    async fn test_reexport_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let export_path = dir.path().join("Rock.fbx");
        let config = ExportConfig::new(&export_path);
        let writer = ExportMetadataWriter::new();

        writer
            .create_metadata("Rock", SceneObjectStats::new(60_000, 30_000), &export_path, &config)
            .await
            .unwrap();
        let (_, path) = writer
            .create_metadata_with_audit(
                "Rock",
                SceneObjectStats::new(9_000, 4_600),
                &export_path,
                &config,
                Some(vec!["rock_normal.tga".into()]),
            )
            .await
            .unwrap();

        let read_back = writer.read_metadata(&path).await.unwrap();
        assert_eq!(read_back.complexity, ComplexityTier::Low);
        assert_eq!(read_back.texture_issues, Some(vec!["rock_normal.tga".to_string()]));
    }

    #[tokio::test]
    async fn test_missing_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExportMetadataWriter::new()
            .read_metadata(&dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
