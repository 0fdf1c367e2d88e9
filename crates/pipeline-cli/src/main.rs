//! asset-pipeline
//!
//! Drives a running 3ds Max session through its file listener, writes the
//! sidecar metadata next to each export, and prepares or validates the
//! matching Unreal import.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use file_bridge::{BridgeConfig, CommandChannel, write_atomic};
use max_bridge::{ExportMetadataWriter, SceneQueryService};
use pipeline_core::{
    DEFAULT_PASS_THRESHOLD, ExportConfig, ImportReport, ValidationEngine, discover_lods,
    sidecar_path,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use unreal_bridge::{
    EditorInspector, ImportConfig, ImportScriptGenerator, PerformanceMeasurer, report_path,
};

const DEFAULT_DESTINATION: &str = unreal_bridge::config::DEFAULT_DESTINATION;

#[derive(Parser)]
#[command(name = "asset-pipeline", version, about = "3ds Max to Unreal asset pipeline")]
struct Cli {
    /// Scratch directory watched by the 3ds Max listener
    #[arg(long, env = "ASSET_PIPELINE_MAX_DIR", global = true)]
    max_dir: Option<PathBuf>,

    /// Scratch directory watched by the Unreal editor listener
    #[arg(long, env = "ASSET_PIPELINE_UNREAL_DIR", global = true)]
    unreal_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether 3ds Max answers
    Probe,
    /// List geometry objects in the open scene
    List,
    /// Print polygon and vertex counts for one object
    Stats { object: String },
    /// Export an object to FBX and write its sidecar
    Export {
        object: String,
        path: PathBuf,
        /// Also export _LOD1.._LOD3 reduced copies
        #[arg(long)]
        lods: bool,
        /// Request Nanite on import
        #[arg(long)]
        nanite: bool,
    },
    /// Write the Unreal import script next to an FBX
    ImportScript {
        fbx: PathBuf,
        #[arg(long, default_value = DEFAULT_DESTINATION)]
        destination: String,
    },
    /// Measure an imported asset in Unreal and compare it with the sidecar
    Validate {
        fbx: PathBuf,
        /// Engine asset path; derived from the destination and FBX name if omitted
        #[arg(long)]
        asset: Option<String>,
        #[arg(long, default_value = DEFAULT_DESTINATION)]
        destination: String,
    },
}

impl Cli {
    fn max_config(&self) -> BridgeConfig {
        match &self.max_dir {
            Some(dir) => BridgeConfig::max().with_dir(dir),
            None => BridgeConfig::max(),
        }
    }

    fn unreal_config(&self) -> BridgeConfig {
        match &self.unreal_dir {
            Some(dir) => BridgeConfig::unreal().with_dir(dir),
            None => BridgeConfig::unreal(),
        }
    }
}

async fn scene(config: BridgeConfig) -> Result<SceneQueryService> {
    let dir = config.scratch_dir.clone();
    let channel = CommandChannel::open(config)
        .await
        .with_context(|| format!("Cannot use scratch directory {}", dir.display()))?;
    Ok(SceneQueryService::new(channel))
}

async fn export(
    config: BridgeConfig,
    object: &str,
    path: &Path,
    lods: bool,
    nanite: bool,
) -> Result<()> {
    let mut scene = scene(config).await?;
    let stats = scene
        .get_stats(object)
        .await
        .with_context(|| format!("Cannot read stats for {}", object))?;

    // A failed audit only loses the texture section of the report.
    let texture_issues = match scene.audit_textures(object).await {
        Ok(issues) => {
            if !issues.is_empty() {
                warn!("{} has missing textures: {}", object, issues.join(", "));
            }
            Some(issues)
        }
        Err(e) => {
            warn!("Texture audit failed for {}: {}", object, e);
            None
        }
    };

    let export_config = ExportConfig::new(path).with_lods(lods).with_nanite(nanite);
    scene
        .export_asset(object, &export_config)
        .await
        .with_context(|| format!("Export of {} failed", object))?;

    let (metadata, sidecar) = ExportMetadataWriter::new()
        .create_metadata_with_audit(object, stats, path, &export_config, texture_issues)
        .await
        .context("FBX was written but the sidecar was not")?;

    println!(
        "Exported {} ({} polygons, {})",
        object, metadata.geometry.polygons, metadata.complexity
    );
    println!("{}", sidecar.display());
    Ok(())
}

async fn validate(
    config: BridgeConfig,
    fbx: &Path,
    asset: Option<String>,
    destination: String,
) -> Result<()> {
    let import_config = ImportConfig::with_destination(destination);
    let asset_path = asset.unwrap_or_else(|| import_config.asset_path_for(fbx));

    let sidecar = sidecar_path(fbx);
    let metadata = match ExportMetadataWriter::new().read_metadata(&sidecar).await {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            warn!("No usable sidecar, skipping validation: {}", e);
            None
        }
    };
    let lod_count = discover_lods(fbx).len();

    let channel = CommandChannel::open(config).await?;
    let mut measurer = PerformanceMeasurer::new(EditorInspector::new(channel));
    let Some(measured) = measurer
        .measure(&asset_path)
        .await
        .with_context(|| format!("Cannot measure {}", asset_path))?
    else {
        bail!("Asset not found in Unreal: {}", asset_path);
    };

    let report = match &metadata {
        Some(metadata) => {
            let result = ValidationEngine::new().validate(metadata, &measured);
            info!(
                "Polygon error {:.2}%, accuracy {:.2}% (threshold {}: {})",
                result.poly_error_percent,
                result.accuracy_score,
                DEFAULT_PASS_THRESHOLD,
                if result.passes(DEFAULT_PASS_THRESHOLD) { "pass" } else { "fail" }
            );
            ImportReport::from_validation(metadata, &measured, lod_count)
        }
        None => {
            let name = fbx
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| asset_path.clone());
            ImportReport::not_validated(name, &measured, lod_count)
        }
    };

    for (metric, value) in report.rows() {
        println!("{:<22} {}", metric, value);
    }

    let html_path = report_path(fbx);
    write_atomic(&html_path, report.render_html().as_bytes())
        .await
        .with_context(|| format!("Cannot write report {}", html_path.display()))?;
    println!("{}", html_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match &cli.command {
        Command::Probe => {
            let mut scene = scene(cli.max_config()).await?;
            if scene.probe().await {
                println!("Connected to 3ds Max");
            } else {
                println!(
                    "3ds Max not connected (is the listener watching {}?)",
                    scene.channel().config().scratch_dir.display()
                );
            }
        }
        Command::List => {
            let mut scene = scene(cli.max_config()).await?;
            for name in scene.list_objects().await.context("Cannot list scene objects")? {
                println!("{}", name);
            }
        }
        Command::Stats { object } => {
            let mut scene = scene(cli.max_config()).await?;
            let stats = scene
                .get_stats(object)
                .await
                .with_context(|| format!("Cannot read stats for {}", object))?;
            println!("{}: {} polygons, {} vertices", object, stats.polygons, stats.vertices);
        }
        Command::Export { object, path, lods, nanite } => {
            export(cli.max_config(), object, path, *lods, *nanite).await?;
        }
        Command::ImportScript { fbx, destination } => {
            let generator =
                ImportScriptGenerator::new(ImportConfig::with_destination(destination.clone()));
            let script = generator
                .save_import_script(fbx)
                .await
                .with_context(|| format!("Cannot write import script for {}", fbx.display()))?;
            println!("{}", script.display());
        }
        Command::Validate { fbx, asset, destination } => {
            validate(cli.unreal_config(), fbx, asset.clone(), destination.clone()).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::try_parse_from([
            "asset-pipeline",
            "--max-dir",
            "/tmp/max",
            "export",
            "Table01",
            "/exports/Table01.fbx",
            "--lods",
        ])
        .unwrap();

        assert_eq!(cli.max_config().command_path(), PathBuf::from("/tmp/max/command.ms"));
        match cli.command {
            Command::Export { object, path, lods, nanite } => {
                assert_eq!(object, "Table01");
                assert_eq!(path, PathBuf::from("/exports/Table01.fbx"));
                assert!(lods);
                assert!(!nanite);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_validate_defaults() {
        let cli = Cli::try_parse_from(["asset-pipeline", "validate", "Chair.fbx"]).unwrap();
        match cli.command {
            Command::Validate { asset, destination, .. } => {
                assert!(asset.is_none());
                assert_eq!(destination, "/Game/ImportedAssets");
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
