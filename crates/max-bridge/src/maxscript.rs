//! MAXScript payload builders
//!
//! Every script evaluates to a single string, which the listener writes to
//! the result file. Failure is signalled with an `ERROR` prefix.

use pipeline_core::{ExportConfig, MAX_LOD_LEVEL, lod_path};

/// Script used to check that the listener is alive
pub const CONNECTION_CHECK: &str = r#"print "Connected""#;

/// ProOptimizer vertex percentage for LOD1, LOD2, LOD3
pub const LOD_VERTEX_PERCENT: [f64; MAX_LOD_LEVEL as usize] = [50.0, 25.0, 12.5];

/// Escape text for use inside a MAXScript string literal
pub fn escape_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Comma-joined names of all geometry nodes
pub fn list_objects() -> String {
    r#"
(
    local objList = #()
    for obj in geometry do (
        append objList obj.name
    )
    local result = ""
    for i = 1 to objList.count do (
        result += objList[i]
        if i < objList.count then result += ","
    )
    result
)
"#
    .to_string()
}

/// `"<polygons>,<vertices>"` for the named node, converting it to Editable Poly first
pub fn object_stats(object_name: &str) -> String {
    format!(
        r#"
(
    local obj = getNodeByName "{name}"
    if obj != undefined then (
        if classof obj.baseobject != Editable_Poly then (
            convertToPoly obj
        )

        local polys = polyOp.getNumFaces obj
        local verts = polyOp.getNumVerts obj

        polys as string + "," + verts as string
    ) else (
        "ERROR: Object not found"
    )
)
"#,
        name = escape_string(object_name)
    )
}

/// Comma-joined file names of bitmaps the node's material references but which are missing on disk
pub fn texture_audit(object_name: &str) -> String {
    format!(
        r#"
(
    local obj = getNodeByName "{name}"
    if obj != undefined then (
        local missing = #()
        if obj.material != undefined then (
            for tex in getClassInstances BitmapTexture target:obj.material do (
                if tex.filename != undefined and tex.filename != "" and not (doesFileExist tex.filename) then (
                    appendIfUnique missing (filenameFromPath tex.filename)
                )
            )
        )
        local result = ""
        for i = 1 to missing.count do (
            result += missing[i]
            if i < missing.count then result += ","
        )
        if result == "" then "OK" else result
    ) else (
        "ERROR: Object not found"
    )
)
"#,
        name = escape_string(object_name)
    )
}

/// Export the named node to FBX, optionally with reduced LOD copies beside it
pub fn export_fbx(object_name: &str, config: &ExportConfig) -> String {
    let export_path = escape_string(&config.export_path.to_string_lossy());

    let lod_block = if config.generate_lods {
        let paths: Vec<String> = (1..=MAX_LOD_LEVEL)
            .map(|level| {
                format!(
                    "\"{}\"",
                    escape_string(&lod_path(&config.export_path, level).to_string_lossy())
                )
            })
            .collect();
        let ratios: Vec<String> = LOD_VERTEX_PERCENT.iter().map(|r| format!("{:.1}", r)).collect();

        format!(
            r#"
        local lodPaths = #({paths})
        local lodRatios = #({ratios})
        for i = 1 to lodPaths.count do (
            local lodObj = copy obj
            lodObj.name = obj.name + "_LOD" + (i as string)
            local opt = ProOptimizer()
            addModifier lodObj opt
            opt.VertexPercent = lodRatios[i]
            opt.Calculate = true
            select lodObj
            exportFile lodPaths[i] #noPrompt selectedOnly:true using:FBXEXP
            delete lodObj
        )
        select obj
"#,
            paths = paths.join(", "),
            ratios = ratios.join(", ")
        )
    } else {
        String::new()
    };

    format!(
        r#"
(
    local obj = getNodeByName "{name}"
    if obj != undefined then (
        select obj
        setUserProp obj "enable_nanite" {nanite}

        FBXExporterSetParam "SmoothingGroups" true
        FBXExporterSetParam "TangentSpaceExport" true
        FBXExporterSetParam "SmoothMeshExport" true

        exportFile "{path}" #noPrompt selectedOnly:true using:FBXEXP
{lods}
        "SUCCESS"
    ) else (
        "ERROR: Object not found"
    )
)
"#,
        name = escape_string(object_name),
        nanite = config.enable_nanite,
        path = export_path,
        lods = lod_block
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_windows_path() {
        assert_eq!(
            escape_string(r"D:\exports\Table01.fbx"),
            r"D:\\exports\\Table01.fbx"
        );
        assert_eq!(escape_string(r#"say "hi""#), r#"say \"hi\""#);
    }

    #[test]
    fn test_stats_script_embeds_name() {
        let script = object_stats("Table01");
        assert!(script.contains(r#"getNodeByName "Table01""#));
        assert!(script.contains("polyOp.getNumFaces obj"));
        assert!(script.contains("ERROR"));
    }

    #[test]
    fn test_export_without_lods() {
        let config = ExportConfig::new(r"D:\exports\Table01.fbx");
        let script = export_fbx("Table01", &config);

        assert!(script.contains(r#"exportFile "D:\\exports\\Table01.fbx""#));
        assert!(script.contains(r#"setUserProp obj "enable_nanite" false"#));
        assert!(!script.contains("ProOptimizer"));
    }

    #[test]
    fn test_export_with_lods_and_nanite() {
        let config = ExportConfig::new("/exports/Table01.fbx")
            .with_lods(true)
            .with_nanite(true);
        let script = export_fbx("Table01", &config);

        assert!(script.contains(
            r#""/exports/Table01_LOD1.fbx", "/exports/Table01_LOD2.fbx", "/exports/Table01_LOD3.fbx""#
        ));
        assert!(script.contains("#(50.0, 25.0, 12.5)"));
        assert!(script.contains("ProOptimizer"));
        assert!(script.contains(r#"setUserProp obj "enable_nanite" true"#));
    }
}
