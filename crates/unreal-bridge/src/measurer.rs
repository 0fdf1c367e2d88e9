//! Post-import measurement
//!
//! The editor-side listener executes the Python it finds in the command
//! file and writes the value of the module-level `result` variable to the
//! result file.

use async_trait::async_trait;
use file_bridge::CommandChannel;
use pipeline_core::{MeasuredStats, PipelineError, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Reply for an asset path that does not resolve to a static mesh
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND";

/// Raw LOD0 counts of an imported static mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshCounts {
    pub triangles: u64,
    pub vertices: u64,
}

/// Source of authoritative mesh counts
#[async_trait]
pub trait MeshInspector: Send {
    /// Counts for the asset at `asset_path`, or `None` if it does not exist
    async fn mesh_counts(&mut self, asset_path: &str) -> Result<Option<MeshCounts>>;
}

/// Python query sent to the editor listener
pub fn mesh_counts_script(asset_path: &str) -> String {
    let literal = serde_json::Value::String(asset_path.to_string()).to_string();
    format!(
        r#"import unreal

asset = unreal.EditorAssetLibrary.load_asset({path})
if asset is None or not isinstance(asset, unreal.StaticMesh):
    result = "{not_found}"
else:
    result = "{{}},{{}}".format(asset.get_num_triangles(0), asset.get_num_vertices(0))
"#,
        path = literal,
        not_found = NOT_FOUND_SENTINEL
    )
}

/// Map the listener's reply onto counts
pub fn parse_mesh_counts(response: &str) -> Result<Option<MeshCounts>> {
    let response = response.trim();
    if response == NOT_FOUND_SENTINEL {
        return Ok(None);
    }
    if response.contains("ERROR") {
        return Err(PipelineError::Protocol(format!(
            "Editor reported an error: {}",
            response
        )));
    }

    let parts: Vec<&str> = response.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [triangles, vertices] => match (triangles.parse(), vertices.parse()) {
            (Ok(triangles), Ok(vertices)) => Ok(Some(MeshCounts {
                triangles,
                vertices,
            })),
            _ => Err(PipelineError::Protocol(format!(
                "Unexpected mesh counts: {:?}",
                response
            ))),
        },
        _ => Err(PipelineError::Protocol(format!(
            "Unexpected mesh counts: {:?}",
            response
        ))),
    }
}

/// Queries a live Unreal editor through the file slot
#[derive(Debug)]
pub struct EditorInspector {
    channel: CommandChannel,
    timeout: Duration,
}

impl EditorInspector {
    pub fn new(channel: CommandChannel) -> Self {
        Self {
            channel,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MeshInspector for EditorInspector {
    async fn mesh_counts(&mut self, asset_path: &str) -> Result<Option<MeshCounts>> {
        let response = self
            .channel
            .execute(&mesh_counts_script(asset_path), self.timeout)
            .await?;
        parse_mesh_counts(&response)
    }
}

/// Turns raw engine counts into [`MeasuredStats`]
pub struct PerformanceMeasurer<I: MeshInspector> {
    inspector: I,
}

impl<I: MeshInspector> PerformanceMeasurer<I> {
    pub fn new(inspector: I) -> Self {
        Self { inspector }
    }

    /// Measure the asset at `asset_path`; `None` if the editor has no such mesh
    pub async fn measure(&mut self, asset_path: &str) -> Result<Option<MeasuredStats>> {
        let Some(counts) = self.inspector.mesh_counts(asset_path).await? else {
            info!("Could not load asset at: {}", asset_path);
            return Ok(None);
        };

        let stats = MeasuredStats::estimate(counts.triangles, counts.vertices);
        debug!(
            "{}: {} triangles, {} vertices, ~{:.2} MB",
            asset_path, stats.triangles, stats.vertices, stats.memory_mb
        );
        Ok(Some(stats))
    }
}
