//! Unreal side of the asset pipeline
//!
//! Two ways of getting a mesh into the editor and checked:
//!
//! - **Generated script**: [`ImportScriptGenerator`] writes a standalone
//!   Python script that imports the FBX, attaches LODs, measures the mesh
//!   and renders a report entirely inside the editor
//! - **Live query**: [`PerformanceMeasurer`] asks an editor-side listener
//!   for triangle/vertex counts through the file slot
//!
//! The script cannot call back into this process, so it carries its own
//! copy of the validation rules from `pipeline-core`.

pub mod config;
pub mod import_script;
pub mod measurer;

pub use config::ImportConfig;
pub use import_script::{ImportScriptGenerator, import_script_path, report_path};
pub use measurer::{EditorInspector, MeshCounts, MeshInspector, PerformanceMeasurer};
