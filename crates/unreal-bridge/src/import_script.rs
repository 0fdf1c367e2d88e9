//! Import script generation
//!
//! The generator only produces text. Everything in the templates below runs
//! later, inside the Unreal editor's Python environment, where this process
//! has no say; that is why the accuracy and verdict rules from
//! `pipeline_core::report` are repeated in Python here.

use crate::config::ImportConfig;
use file_bridge::write_atomic;
use pipeline_core::{
    BYTES_PER_VERTEX, ComplexityTier, IMPORT_PASS_THRESHOLD, MAX_LOD_LEVEL, Result,
    lod_base_name, lod_path, sidecar_path,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Path of the generated script for `fbx_path`: `<stem>_import.py` beside it
pub fn import_script_path(fbx_path: &Path) -> PathBuf {
    with_stem_suffix(fbx_path, "_import.py")
}

/// Path of the report the script writes: `<stem>_report.html` beside the FBX
pub fn report_path(fbx_path: &Path) -> PathBuf {
    with_stem_suffix(fbx_path, "_report.html")
}

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, suffix))
}

/// Python string literal for `text`.
///
/// JSON string escapes are a subset of Python's, so the JSON encoding is a
/// valid literal.
fn py_str(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Python path literal with forward slashes
fn py_path(path: &Path) -> String {
    py_str(&path.to_string_lossy().replace('\\', "/"))
}

/// Builds the Python import script for one FBX
#[derive(Debug, Clone, Default)]
pub struct ImportScriptGenerator {
    config: ImportConfig,
}

impl ImportScriptGenerator {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Script text for `fbx_path`.
    ///
    /// An LOD file gets a script that only tells the user to import its
    /// base file instead.
    pub fn generate(&self, fbx_path: &Path) -> String {
        if let Some(base) = lod_base_name(fbx_path) {
            warn!(
                "{} is an LOD variant; generating error script pointing at {}",
                fbx_path.display(),
                base
            );
            return self.lod_error_script(fbx_path, &base);
        }
        self.import_script(fbx_path)
    }

    /// Write the script beside the FBX and return its path
    pub async fn save_import_script(&self, fbx_path: &Path) -> Result<PathBuf> {
        let script = self.generate(fbx_path);
        let path = import_script_path(fbx_path);
        write_atomic(&path, script.as_bytes()).await?;
        info!("Import script saved: {}", path.display());
        Ok(path)
    }

    fn lod_error_script(&self, fbx_path: &Path, base: &str) -> String {
        let file_name = fbx_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let message = format!(
            "'{}' is an LOD variant. Import the base file '{}' instead; \
             its LODs are attached automatically.",
            file_name, base
        );

        LOD_ERROR_TEMPLATE.replace("@MESSAGE@", &py_str(&message))
    }

    fn import_script(&self, fbx_path: &Path) -> String {
        let asset_name = fbx_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lod_paths: Vec<String> = (1..=MAX_LOD_LEVEL)
            .map(|level| py_path(&lod_path(fbx_path, level)))
            .collect();

        IMPORT_TEMPLATE
            .replace("@ASSET_NAME@", &py_str(&asset_name))
            .replace("@FBX_PATH@", &py_path(fbx_path))
            .replace("@SIDECAR_PATH@", &py_path(&sidecar_path(fbx_path)))
            .replace("@REPORT_PATH@", &py_path(&report_path(fbx_path)))
            .replace("@DESTINATION@", &py_str(&self.config.destination))
            .replace("@LOD_DESTINATION@", &py_str(&self.config.lod_destination()))
            .replace("@LOD_PATHS@", &format!("[{}]", lod_paths.join(", ")))
            .replace("@PASS_THRESHOLD@", &format!("{:.1}", IMPORT_PASS_THRESHOLD))
            .replace("@BYTES_PER_VERTEX@", &BYTES_PER_VERTEX.to_string())
            .replace("@MEDIUM_POLYGONS@", &ComplexityTier::MEDIUM_POLYGONS.to_string())
            .replace("@HIGH_POLYGONS@", &ComplexityTier::HIGH_POLYGONS.to_string())
    }
}

const LOD_ERROR_TEMPLATE: &str = r#"import unreal

MESSAGE = @MESSAGE@

unreal.log_error(MESSAGE)
unreal.EditorDialog.show_message("Asset Pipeline", MESSAGE, unreal.AppMsgType.OK)
"#;

const IMPORT_TEMPLATE: &str = r##"import json
import os
import webbrowser

import unreal

ASSET_NAME = @ASSET_NAME@
FBX_PATH = @FBX_PATH@
SIDECAR_PATH = @SIDECAR_PATH@
REPORT_PATH = @REPORT_PATH@
DESTINATION = @DESTINATION@
LOD_DESTINATION = @LOD_DESTINATION@
LOD_PATHS = @LOD_PATHS@
PASS_THRESHOLD = @PASS_THRESHOLD@
BYTES_PER_VERTEX = @BYTES_PER_VERTEX@
MEDIUM_POLYGONS = @MEDIUM_POLYGONS@
HIGH_POLYGONS = @HIGH_POLYGONS@
TIERS = ("Low", "Medium", "High", "Very High")


def load_metadata(path):
    if not os.path.exists(path):
        unreal.log_warning("No metadata at {} - no validation available".format(path))
        return None
    try:
        with open(path, "r") as f:
            data = json.load(f)
    except (OSError, ValueError) as e:
        unreal.log_warning("Unreadable metadata {} ({}) - no validation available".format(path, e))
        return None
    problem = sidecar_problem(data)
    if problem:
        unreal.log_warning("Invalid metadata {} ({}) - no validation available".format(path, problem))
        return None
    return data


def is_count(value):
    return isinstance(value, int) and not isinstance(value, bool) and value >= 0


def sidecar_problem(data):
    if not isinstance(data, dict):
        return "not an object"
    for key in ("asset_name", "export_path"):
        if not isinstance(data.get(key), str):
            return "missing {}".format(key)
    geometry = data.get("geometry")
    if not isinstance(geometry, dict):
        return "missing geometry"
    for key in ("polygons", "vertices"):
        if not is_count(geometry.get(key)):
            return "missing geometry.{}".format(key)
    if data.get("complexity") is not None and data["complexity"] not in TIERS:
        return "unknown complexity {}".format(data["complexity"])
    if "generate_lods" in data and not isinstance(data["generate_lods"], bool):
        return "generate_lods is not a boolean"
    if data.get("enable_nanite") is not None and not isinstance(data["enable_nanite"], bool):
        return "enable_nanite is not a boolean"
    issues = data.get("texture_issues")
    if issues is not None and not (
        isinstance(issues, list) and all(isinstance(i, str) for i in issues)
    ):
        return "texture_issues is not a list of names"
    return None


def import_fbx(filename, destination):
    task = unreal.AssetImportTask()
    task.filename = filename
    task.destination_path = destination
    task.automated = True
    task.replace_existing = True
    task.save = True

    options = unreal.FbxImportUI()
    options.import_mesh = True
    options.import_materials = True
    options.import_textures = False
    options.import_as_skeletal = False

    sm_options = unreal.FbxStaticMeshImportData()
    sm_options.combine_meshes = True
    sm_options.auto_generate_collision = True
    options.static_mesh_import_data = sm_options
    task.options = options

    unreal.AssetToolsHelpers.get_asset_tools().import_asset_tasks([task])
    name = os.path.splitext(os.path.basename(filename))[0]
    return unreal.EditorAssetLibrary.load_asset("{}/{}".format(destination, name))


def attach_lods(mesh):
    count = 0
    for lod_index, lod_file in enumerate(LOD_PATHS, start=1):
        if not os.path.exists(lod_file):
            break
        lod_mesh = import_fbx(lod_file, LOD_DESTINATION)
        if lod_mesh is None:
            unreal.log_warning("Could not load LOD {}".format(lod_file))
            break
        unreal.EditorStaticMeshLibrary.set_lod_from_static_mesh(mesh, lod_index, lod_mesh, 0, True)
        unreal.log("Attached LOD{} from {}".format(lod_index, lod_file))
        count += 1
    return count


def apply_nanite(mesh, enabled):
    settings = mesh.get_editor_property("nanite_settings")
    settings.enabled = enabled
    mesh.set_editor_property("nanite_settings", settings)


def accuracy_score(predicted, actual):
    if predicted <= 0:
        return 100.0
    return 100.0 - abs(predicted - actual) / float(predicted) * 100.0


def classify_polygons(polygons):
    tier = "Low"
    if polygons > MEDIUM_POLYGONS:
        tier = "Medium"
    if polygons > HIGH_POLYGONS:
        tier = "High"
    return tier


def decide_verdict(accuracy, nanite, triangles):
    if accuracy > PASS_THRESHOLD:
        return "PASSED", accuracy
    if nanite and triangles > 0:
        return "PASSED (Nanite-optimized)", 100.0
    return "FAILED", accuracy


def classify_memory(memory_mb):
    if memory_mb <= 1:
        return "Low"
    elif memory_mb <= 5:
        return "Medium"
    elif memory_mb <= 20:
        return "High"
    return "Very High"


def texture_audit(metadata):
    if metadata is None or metadata.get("texture_issues") is None:
        return "Not audited"
    issues = metadata["texture_issues"]
    if not issues:
        return "No issues"
    return "{} issue(s): {}".format(len(issues), ", ".join(issues))


def escape_html(text):
    return (str(text).replace("&", "&amp;").replace("<", "&lt;")
            .replace(">", "&gt;").replace('"', "&quot;"))


def write_report(rows, verdict, passed):
    color = "#2e7d32" if passed else "#c62828"
    body = "".join(
        "      <tr><td>{}</td><td>{}</td></tr>\n".format(metric, escape_html(value))
        for metric, value in rows
    )
    html = (
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n"
        "  <title>Import Report: {name}</title>\n"
        "  <style>\n"
        "    body {{ font-family: sans-serif; margin: 2em; }}\n"
        "    table {{ border-collapse: collapse; }}\n"
        "    td, th {{ border: 1px solid #999; padding: 4px 12px; }}\n"
        "    .verdict {{ color: {color}; font-weight: bold; }}\n"
        "  </style>\n</head>\n<body>\n"
        "  <h1>Import Report: {name}</h1>\n"
        "  <table>\n    <thead><tr><th>Metric</th><th>Value</th></tr></thead>\n"
        "    <tbody>\n{body}    </tbody>\n  </table>\n"
        "  <p class=\"verdict\">{verdict}</p>\n</body>\n</html>\n"
    ).format(name=escape_html(ASSET_NAME), color=color, body=body, verdict=verdict)

    with open(REPORT_PATH, "w") as f:
        f.write(html)

    for metric, value in rows:
        unreal.log("{:<22}{}".format(metric, value))
    unreal.log("Report written to {}".format(REPORT_PATH))
    webbrowser.open("file:///" + REPORT_PATH.lstrip("/"))


def main():
    unreal.log("=== ASSET PIPELINE IMPORT: {} ===".format(ASSET_NAME))
    if not os.path.exists(FBX_PATH):
        unreal.log_error("FBX file not found: {}".format(FBX_PATH))
        return

    metadata = load_metadata(SIDECAR_PATH)
    nanite = bool(metadata.get("enable_nanite")) if metadata is not None else False
    if metadata is not None:
        unreal.log("Texture issues recorded: {}".format("yes" if "texture_issues" in metadata else "no"))
        unreal.log("Nanite requested: {}".format("yes" if nanite else "no"))

    mesh = import_fbx(FBX_PATH, DESTINATION)
    if mesh is None or not isinstance(mesh, unreal.StaticMesh):
        unreal.log_error("Could not load imported asset {}/{}".format(DESTINATION, ASSET_NAME))
        return

    apply_nanite(mesh, nanite)
    lod_count = attach_lods(mesh)
    unreal.EditorAssetLibrary.save_loaded_asset(mesh)

    triangles = mesh.get_num_triangles(0)
    vertices = mesh.get_num_vertices(0)
    memory_mb = vertices * BYTES_PER_VERTEX / (1024.0 * 1024.0)
    actual_complexity = classify_memory(memory_mb)

    if metadata is None:
        verdict = "NO VALIDATION AVAILABLE"
        passed = False
        rows = [
            ("Predicted Polygons", "N/A"),
            ("Actual Triangles", triangles),
            ("Accuracy", "N/A"),
            ("Predicted Complexity", "N/A"),
            ("Actual Complexity", actual_complexity),
            ("Data Source", "Unreal measurement only"),
            ("LOD Count", lod_count),
            ("Nanite", "Disabled"),
            ("Texture Audit", "Not audited"),
            ("Verdict", verdict),
        ]
    else:
        predicted = metadata["geometry"]["polygons"]
        verdict, accuracy = decide_verdict(accuracy_score(predicted, triangles), nanite, triangles)
        passed = verdict.startswith("PASSED")
        rows = [
            ("Predicted Polygons", predicted),
            ("Actual Triangles", triangles),
            ("Accuracy", "{:.2f}%".format(accuracy)),
            ("Predicted Complexity", metadata.get("complexity") or classify_polygons(predicted)),
            ("Actual Complexity", actual_complexity),
            ("Data Source", "3ds Max metadata + Unreal measurement"),
            ("LOD Count", lod_count),
            ("Nanite", "Enabled" if nanite else "Disabled"),
            ("Texture Audit", texture_audit(metadata)),
            ("Verdict", verdict),
        ]

    write_report(rows, verdict, passed)
    if passed:
        unreal.log("VALIDATION {}".format(verdict))
    else:
        unreal.log_warning("VALIDATION {}".format(verdict))


main()
"##;
