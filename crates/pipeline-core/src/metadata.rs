//! Export configuration and sidecar metadata
//!
//! Every successful export is followed by a JSON sidecar with the same
//! basename as the FBX. The sidecar is the only thing the Unreal side
//! trusts about the asset: it is written once and replaced wholesale on
//! re-export, never edited in place.

use crate::stats::{ComplexityTier, SceneObjectStats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension of sidecar metadata files
pub const SIDECAR_EXTENSION: &str = "json";

/// Options chosen by the user for a single export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub export_path: PathBuf,
    #[serde(default)]
    pub generate_lods: bool,
    #[serde(default)]
    pub enable_nanite: bool,
}

impl ExportConfig {
    pub fn new(export_path: impl Into<PathBuf>) -> Self {
        Self {
            export_path: export_path.into(),
            generate_lods: false,
            enable_nanite: false,
        }
    }

    pub fn with_lods(mut self, generate_lods: bool) -> Self {
        self.generate_lods = generate_lods;
        self
    }

    pub fn with_nanite(mut self, enable_nanite: bool) -> Self {
        self.enable_nanite = enable_nanite;
        self
    }
}

/// Geometry block of the sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub polygons: u64,
    pub vertices: u64,
}

impl From<SceneObjectStats> for Geometry {
    fn from(stats: SceneObjectStats) -> Self {
        Self {
            polygons: stats.polygons,
            vertices: stats.vertices,
        }
    }
}

/// Sidecar record describing a just-exported asset
///
/// Only `asset_name`, `export_path` and `geometry` are required when
/// reading; a sidecar without `complexity` gets the polygon-based tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SidecarRecord")]
pub struct ExportMetadata {
    pub asset_name: String,
    pub export_path: String,
    pub geometry: Geometry,
    /// Polygon-based tier; see [`ComplexityTier::from_polygons`]
    pub complexity: ComplexityTier,
    pub generate_lods: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_nanite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_issues: Option<Vec<String>>,
}

/// Sidecar as found on disk, minimal or extended
#[derive(Deserialize)]
struct SidecarRecord {
    asset_name: String,
    export_path: String,
    geometry: Geometry,
    #[serde(default)]
    complexity: Option<ComplexityTier>,
    #[serde(default)]
    generate_lods: bool,
    #[serde(default)]
    enable_nanite: Option<bool>,
    #[serde(default)]
    texture_issues: Option<Vec<String>>,
}

impl From<SidecarRecord> for ExportMetadata {
    fn from(record: SidecarRecord) -> Self {
        let complexity = record
            .complexity
            .unwrap_or_else(|| ComplexityTier::from_polygons(record.geometry.polygons));
        Self {
            asset_name: record.asset_name,
            export_path: record.export_path,
            geometry: record.geometry,
            complexity,
            generate_lods: record.generate_lods,
            enable_nanite: record.enable_nanite,
            texture_issues: record.texture_issues,
        }
    }
}

impl ExportMetadata {
    /// Build the record for an export of `asset_name` with the given stats
    pub fn new(
        asset_name: impl Into<String>,
        stats: SceneObjectStats,
        config: &ExportConfig,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            export_path: config.export_path.to_string_lossy().into_owned(),
            geometry: stats.into(),
            complexity: ComplexityTier::from_polygons(stats.polygons),
            generate_lods: config.generate_lods,
            enable_nanite: Some(config.enable_nanite),
            texture_issues: None,
        }
    }

    /// Attach the result of a texture audit
    pub fn with_texture_issues(mut self, issues: Vec<String>) -> Self {
        self.texture_issues = Some(issues);
        self
    }

    /// Predicted polygon count
    pub fn polygons(&self) -> u64 {
        self.geometry.polygons
    }

    pub fn nanite_requested(&self) -> bool {
        self.enable_nanite.unwrap_or(false)
    }

    /// Serialize to the pretty-printed sidecar form
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a sidecar document
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Sidecar path for an exported artifact: same basename, `.json` extension
pub fn sidecar_path(export_path: &Path) -> PathBuf {
    export_path.with_extension(SIDECAR_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_config() -> ExportConfig {
        ExportConfig::new("/exports/Table01.fbx").with_lods(true)
    }

    #[test]
    fn test_sidecar_path_swaps_extension() {
        assert_eq!(
            sidecar_path(Path::new("/exports/Table01.fbx")),
            PathBuf::from("/exports/Table01.json")
        );
        assert_eq!(
            sidecar_path(Path::new("C:/My Assets/chair.v2.fbx")),
            PathBuf::from("C:/My Assets/chair.v2.json")
        );
    }

    #[test]
    fn test_new_classifies_by_polygons() {
        let stats = SceneObjectStats::new(45_000, 23_000);
        let metadata = ExportMetadata::new("Table01", stats, &table_config());

        assert_eq!(metadata.complexity, ComplexityTier::Medium);
        assert_eq!(metadata.geometry.polygons, 45_000);
        assert_eq!(metadata.geometry.vertices, 23_000);
        assert!(metadata.generate_lods);
        assert_eq!(metadata.enable_nanite, Some(false));
        assert_eq!(metadata.export_path, "/exports/Table01.fbx");
    }

    #[test]
    fn test_sidecar_layout() {
        let stats = SceneObjectStats::new(45_000, 23_000);
        let metadata = ExportMetadata::new("Table01", stats, &table_config());
        let value: serde_json::Value = serde_json::from_str(&metadata.to_json().unwrap()).unwrap();

        assert_eq!(value["asset_name"], "Table01");
        assert_eq!(value["geometry"]["polygons"], 45_000);
        assert_eq!(value["geometry"]["vertices"], 23_000);
        assert_eq!(value["complexity"], "Medium");
        assert_eq!(value["enable_nanite"], false);
        assert!(value.get("texture_issues").is_none());
    }

    #[test]
    fn test_minimal_sidecar_parses() {
        let json = r#"{
            "asset_name": "Rock",
            "export_path": "D:/exports/Rock.fbx",
            "geometry": {"polygons": 7306, "vertices": 3655},
            "complexity": "Low"
        }"#;

        let metadata = ExportMetadata::from_json(json).unwrap();
        assert_eq!(metadata.polygons(), 7306);
        assert!(!metadata.nanite_requested());
        assert!(metadata.texture_issues.is_none());
    }

    #[test]
    fn test_missing_complexity_is_derived() {
        let json = r#"{"asset_name":"Rock","export_path":"D:/exports/Rock.fbx",
            "geometry":{"polygons":7306,"vertices":3655}}"#;
        let metadata = ExportMetadata::from_json(json).unwrap();
        assert_eq!(metadata.complexity, ComplexityTier::Low);
        assert_eq!(metadata.enable_nanite, None);

        let json = r#"{"asset_name":"Statue","export_path":"statue.fbx",
            "geometry":{"polygons":60000,"vertices":30000}}"#;
        let metadata = ExportMetadata::from_json(json).unwrap();
        assert_eq!(metadata.complexity, ComplexityTier::High);
    }

    #[test]
    fn test_recorded_complexity_wins() {
        let json = r#"{
            "asset_name": "Rock",
            "export_path": "rock.fbx",
            "geometry": {"polygons": 10, "vertices": 8},
            "complexity": "Very High"
        }"#;
        let metadata = ExportMetadata::from_json(json).unwrap();
        assert_eq!(metadata.complexity, ComplexityTier::VeryHigh);
    }

    #[test]
    fn test_incomplete_sidecar_is_rejected() {
        for json in [
            r#"{"asset_name":"Table01","export_path":"x","complexity":"Medium"}"#,
            r#"{"asset_name":"Table01","export_path":"x","geometry":{"vertices":3}}"#,
            r#"{"export_path":"x","geometry":{"polygons":1,"vertices":1}}"#,
            r#"[1, 2]"#,
        ] {
            let result = ExportMetadata::from_json(json);
            assert!(
                matches!(result, Err(crate::PipelineError::Serialization(_))),
                "{}",
                json
            );
        }
    }

    #[test]
    fn test_texture_issues_round_trip() {
        let config = ExportConfig::new("crate.fbx");
        let metadata = ExportMetadata::new("Crate", SceneObjectStats::new(12, 8), &config)
            .with_texture_issues(vec!["wood_diffuse.png".into()]);

        let parsed = ExportMetadata::from_json(&metadata.to_json().unwrap()).unwrap();
        assert_eq!(parsed.texture_issues, Some(vec!["wood_diffuse.png".to_string()]));
    }
}
