//! # pipeline-core
//!
//! Core types for the asset pipeline that moves meshes from 3ds Max into Unreal.
//!
//! This crate provides the pieces shared by both sides of the bridge:
//! - Scene statistics and complexity tiers
//! - Export configuration and sidecar metadata
//! - LOD naming conventions and discovery
//! - Prediction-vs-measurement validation
//! - Import reports and verdicts

pub mod error;
pub mod lod;
pub mod metadata;
pub mod report;
pub mod stats;
pub mod validation;

pub use error::{PipelineError, Result};
pub use lod::{MAX_LOD_LEVEL, discover_lods, lod_base_name, lod_path};
pub use metadata::{ExportConfig, ExportMetadata, Geometry, sidecar_path};
pub use report::{IMPORT_PASS_THRESHOLD, ImportReport, Verdict};
pub use stats::{BYTES_PER_VERTEX, ComplexityTier, MeasuredStats, SceneObjectStats};
pub use validation::{DEFAULT_PASS_THRESHOLD, ValidationEngine, ValidationResult};
