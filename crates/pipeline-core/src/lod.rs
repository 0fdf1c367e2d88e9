//! LOD naming convention
//!
//! A level-of-detail variant lives beside its base artifact and is named
//! `<base>_LOD<n>.<ext>`, with `n` counting up from 1.

use std::path::{Path, PathBuf};

/// Highest LOD suffix that is looked for
pub const MAX_LOD_LEVEL: u32 = 3;

const LOD_MARKER: &str = "_LOD";

/// Byte offset of the first `_LOD<digit>` marker in `stem`
fn lod_marker(stem: &str) -> Option<usize> {
    stem.match_indices(LOD_MARKER)
        .map(|(idx, _)| idx)
        .find(|&idx| {
            stem[idx + LOD_MARKER.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
}

/// If `path` names an LOD variant, the file name of its base artifact.
///
/// `Chair_LOD2.fbx` yields `Chair.fbx`; `Chair.fbx` yields `None`.
pub fn lod_base_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let idx = lod_marker(stem)?;
    let base = &stem[..idx];
    Some(match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", base, ext),
        None => base.to_string(),
    })
}

/// Path of LOD `level` for the base artifact at `base`
pub fn lod_path(base: &Path, level: u32) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}{}{}.{}", stem, LOD_MARKER, level, ext.to_string_lossy()),
        None => format!("{}{}{}", stem, LOD_MARKER, level),
    };
    base.with_file_name(name)
}

/// Look for `_LOD1` through `_LOD3` next to `base`, stopping at the first gap
pub fn discover_lods(base: &Path) -> Vec<PathBuf> {
    discover_lods_with(base, |p| p.is_file())
}

/// [`discover_lods`] with a caller-supplied existence check
pub fn discover_lods_with<F>(base: &Path, exists: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    (1..=MAX_LOD_LEVEL)
        .map(|level| lod_path(base, level))
        .take_while(|path| exists(path))
        .collect()
}
