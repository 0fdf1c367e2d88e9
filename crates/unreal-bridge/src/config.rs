//! Import configuration

use std::path::Path;

/// Content folder that imported meshes land in
pub const DEFAULT_DESTINATION: &str = "/Game/ImportedAssets";

/// Where imports go inside the Unreal project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Content-browser path, e.g. `/Game/ImportedAssets`
    pub destination: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
        }
    }
}

impl ImportConfig {
    pub fn with_destination(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into().trim_end_matches('/').to_string(),
        }
    }

    /// Content path the importer gives the FBX at `fbx_path`
    pub fn asset_path_for(&self, fbx_path: &Path) -> String {
        let stem = fbx_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{}", self.destination, stem)
    }

    /// Folder that LOD source meshes are imported into before being attached
    pub fn lod_destination(&self) -> String {
        format!("{}/LODs", self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_path() {
        let config = ImportConfig::default();
        assert_eq!(
            config.asset_path_for(Path::new("D:/exports/Table01.fbx")),
            "/Game/ImportedAssets/Table01"
        );
        assert_eq!(config.lod_destination(), "/Game/ImportedAssets/LODs");
    }

    #[test]
    fn test_trailing_slash_dropped() {
        let config = ImportConfig::with_destination("/Game/Props/");
        assert_eq!(config.asset_path_for(Path::new("chair.fbx")), "/Game/Props/chair");
    }
}
