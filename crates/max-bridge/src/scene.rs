//! Typed scene queries against 3ds Max

use crate::maxscript;
use crate::protocol::{ExportResponse, ListResponse, StatsResponse, TextureAuditResponse};
use file_bridge::CommandChannel;
use pipeline_core::{ExportConfig, PipelineError, Result, SceneObjectStats};
use std::time::Duration;
use tracing::{debug, info};

/// Per-request time budgets
///
/// 3ds Max does all work synchronously and reports no progress, so long
/// operations simply get long budgets.
#[derive(Debug, Clone)]
pub struct QueryTimeouts {
    pub connection_check: Duration,
    pub list: Duration,
    pub stats: Duration,
    pub texture_audit: Duration,
    pub export: Duration,
    /// Used instead of `export` when LOD copies are generated
    pub export_with_lods: Duration,
}

impl Default for QueryTimeouts {
    fn default() -> Self {
        Self {
            connection_check: Duration::from_secs(5),
            list: Duration::from_secs(10),
            stats: Duration::from_secs(15),
            texture_audit: Duration::from_secs(15),
            export: Duration::from_secs(60),
            export_with_lods: Duration::from_secs(180),
        }
    }
}

/// Scene queries and export requests for a 3ds Max session
#[derive(Debug)]
pub struct SceneQueryService {
    channel: CommandChannel,
    timeouts: QueryTimeouts,
}

impl SceneQueryService {
    pub fn new(channel: CommandChannel) -> Self {
        Self::with_timeouts(channel, QueryTimeouts::default())
    }

    pub fn with_timeouts(channel: CommandChannel, timeouts: QueryTimeouts) -> Self {
        Self { channel, timeouts }
    }

    pub fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    /// Whether the 3ds Max listener answers; never fails
    pub async fn probe(&mut self) -> bool {
        self.channel.probe(maxscript::CONNECTION_CHECK, self.timeouts.connection_check).await
    }

    /// Names of all geometry nodes in the scene
    pub async fn list_objects(&mut self) -> Result<Vec<String>> {
        let response = self
            .channel
            .execute(&maxscript::list_objects(), self.timeouts.list)
            .await?;

        let objects = ListResponse::parse(&response).into_result()?;
        info!("Loaded {} objects from scene", objects.len());
        Ok(objects)
    }

    /// Polygon and vertex counts for one node
    pub async fn get_stats(&mut self, object_name: &str) -> Result<SceneObjectStats> {
        let response = self
            .channel
            .execute(&maxscript::object_stats(object_name), self.timeouts.stats)
            .await?;

        let stats = StatsResponse::parse(&response).into_result(object_name)?;
        debug!(
            "{}: {} polygons, {} vertices",
            object_name, stats.polygons, stats.vertices
        );
        Ok(stats)
    }

    /// File names of missing bitmaps referenced by the node's material
    pub async fn audit_textures(&mut self, object_name: &str) -> Result<Vec<String>> {
        let response = self
            .channel
            .execute(
                &maxscript::texture_audit(object_name),
                self.timeouts.texture_audit,
            )
            .await?;

        TextureAuditResponse::parse(&response).into_result(object_name)
    }

    /// Export one node to FBX, plus LOD copies when requested
    pub async fn export_asset(&mut self, object_name: &str, config: &ExportConfig) -> Result<()> {
        if config.export_path.file_name().is_none() {
            return Err(PipelineError::InvalidInput(format!(
                "Export path has no file name: {}",
                config.export_path.display()
            )));
        }

        let timeout = if config.generate_lods {
            self.timeouts.export_with_lods
        } else {
            self.timeouts.export
        };

        info!(
            "Exporting {} to {} (LODs: {}, Nanite: {})",
            object_name,
            config.export_path.display(),
            config.generate_lods,
            config.enable_nanite
        );

        let response = self
            .channel
            .execute(&maxscript::export_fbx(object_name, config), timeout)
            .await?;

        ExportResponse::parse(&response).into_result()?;
        info!("FBX exported: {}", config.export_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use file_bridge::BridgeConfig;
    use tokio::fs;
    use tokio::time::sleep;

    /// Answers every command with `answer(command)` until the sender is dropped
    fn spawn_listener<F>(config: BridgeConfig, answer: F) -> tokio::task::JoinHandle<()>
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        tokio::spawn(async move {
            let command_path = config.command_path();
            loop {
                if let Ok(command) = fs::read_to_string(&command_path).await {
                    let _ = fs::remove_file(&command_path).await;
                    let _ = fs::write(config.result_path(), answer(&command)).await;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
    }

    /// Minimal fake 3ds Max scene with a single table
    fn fake_max(command: &str) -> String {
        if command.contains("for obj in geometry") {
            "Table01,Chair02".into()
        } else if command.contains(r#"getNodeByName "Table01""#) {
            if command.contains("exportFile") {
                "SUCCESS".into()
            } else if command.contains("BitmapTexture") {
                "OK".into()
            } else {
                "45000,23000".into()
            }
        } else if command.contains("getNodeByName") {
            "ERROR: Object not found".into()
        } else {
            "OK".into()
        }
    }

    async fn service(dir: &std::path::Path) -> (SceneQueryService, tokio::task::JoinHandle<()>) {
        let config = BridgeConfig::default()
            .with_dir(dir)
            .with_poll_interval(Duration::from_millis(10));
        let listener = spawn_listener(config.clone(), fake_max);
        let channel = CommandChannel::open(config).await.unwrap();
        (SceneQueryService::new(channel), listener)
    }

    #[tokio::test]
    async fn test_list_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scene, listener) = service(dir.path()).await;

        assert!(scene.probe().await);
        assert_eq!(scene.list_objects().await.unwrap(), vec!["Table01", "Chair02"]);
        assert_eq!(
            scene.get_stats("Table01").await.unwrap(),
            SceneObjectStats::new(45_000, 23_000)
        );
        assert!(scene.audit_textures("Table01").await.unwrap().is_empty());

        listener.abort();
    }

    #[tokio::test]
    async fn test_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scene, listener) = service(dir.path()).await;

        assert!(matches!(
            scene.get_stats("Ghost").await,
            Err(PipelineError::NotFound(_))
        ));
        match scene
            .export_asset("Ghost", &ExportConfig::new(dir.path().join("Ghost.fbx")))
            .await
        {
            Err(PipelineError::Export(message)) => assert_eq!(message, "ERROR: Object not found"),
            other => panic!("expected export fault, got {:?}", other),
        }

        listener.abort();
    }

    #[tokio::test]
    async fn test_export_success() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scene, listener) = service(dir.path()).await;

        let config = ExportConfig::new(dir.path().join("Table01.fbx")).with_lods(true);
        scene.export_asset("Table01", &config).await.unwrap();

        listener.abort();
    }

    #[tokio::test]
    async fn test_export_rejects_bare_directory() {
        let dir = tempfile::tempdir().unwrap();
        let channel = CommandChannel::new(BridgeConfig::default().with_dir(dir.path()));
        let mut scene = SceneQueryService::new(channel);

        let err = scene
            .export_asset("Table01", &ExportConfig::new("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        // Nothing was sent
        assert!(!dir.path().join("command.ms").exists());
    }
}
