//! Import reports and verdicts
//!
//! The generated Unreal script renders the same table from inside the
//! editor; the rules here are the reference for that script.

use crate::metadata::ExportMetadata;
use crate::stats::{ComplexityTier, MeasuredStats};
use crate::validation::ValidationEngine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accuracy an import must exceed to pass outright
pub const IMPORT_PASS_THRESHOLD: f64 = 90.0;

/// Final outcome of an import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    /// Geometry diverged but Nanite owns the triangle budget
    PassedNanite,
    Failed,
    /// No sidecar was available to compare against
    NotValidated,
}

impl Verdict {
    /// Decide the verdict and the accuracy to report.
    ///
    /// Accuracy is forced to 100 when the pass comes from Nanite.
    pub fn decide(accuracy: f64, nanite_enabled: bool, actual_triangles: u64) -> (Verdict, f64) {
        if accuracy > IMPORT_PASS_THRESHOLD {
            (Verdict::Passed, accuracy)
        } else if nanite_enabled && actual_triangles > 0 {
            (Verdict::PassedNanite, 100.0)
        } else {
            (Verdict::Failed, accuracy)
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Passed | Verdict::PassedNanite)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Passed => "PASSED",
            Verdict::PassedNanite => "PASSED (Nanite-optimized)",
            Verdict::Failed => "FAILED",
            Verdict::NotValidated => "NO VALIDATION AVAILABLE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-facing summary of one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub asset_name: String,
    pub predicted_polygons: Option<u64>,
    pub actual_triangles: u64,
    pub accuracy_score: Option<f64>,
    pub predicted_complexity: Option<ComplexityTier>,
    pub actual_complexity: ComplexityTier,
    pub lod_count: usize,
    pub nanite_enabled: bool,
    pub texture_audit: String,
    pub verdict: Verdict,
}

impl ImportReport {
    /// Report for an import that had a sidecar to validate against
    pub fn from_validation(
        metadata: &ExportMetadata,
        measured: &MeasuredStats,
        lod_count: usize,
    ) -> Self {
        let validation = ValidationEngine::new().validate(metadata, measured);
        let nanite_enabled = metadata.nanite_requested();
        let (verdict, accuracy) =
            Verdict::decide(validation.accuracy_score, nanite_enabled, measured.triangles);

        Self {
            asset_name: metadata.asset_name.clone(),
            predicted_polygons: Some(metadata.polygons()),
            actual_triangles: measured.triangles,
            accuracy_score: Some(accuracy),
            predicted_complexity: Some(validation.predicted_complexity),
            actual_complexity: validation.actual_complexity,
            lod_count,
            nanite_enabled,
            texture_audit: texture_audit(metadata.texture_issues.as_deref()),
            verdict,
        }
    }

    /// Report for an import without a sidecar
    pub fn not_validated(
        asset_name: impl Into<String>,
        measured: &MeasuredStats,
        lod_count: usize,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            predicted_polygons: None,
            actual_triangles: measured.triangles,
            accuracy_score: None,
            predicted_complexity: None,
            actual_complexity: ComplexityTier::from_memory_mb(measured.memory_mb),
            lod_count,
            nanite_enabled: false,
            texture_audit: "Not audited".into(),
            verdict: Verdict::NotValidated,
        }
    }

    pub fn data_source(&self) -> &'static str {
        if self.predicted_polygons.is_some() {
            "3ds Max metadata + Unreal measurement"
        } else {
            "Unreal measurement only"
        }
    }

    /// Metric/value rows in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let or_na = |v: Option<String>| v.unwrap_or_else(|| "N/A".to_string());
        vec![
            ("Predicted Polygons", or_na(self.predicted_polygons.map(|p| p.to_string()))),
            ("Actual Triangles", self.actual_triangles.to_string()),
            ("Accuracy", or_na(self.accuracy_score.map(|a| format!("{:.2}%", a)))),
            ("Predicted Complexity", or_na(self.predicted_complexity.map(|c| c.to_string()))),
            ("Actual Complexity", self.actual_complexity.to_string()),
            ("Data Source", self.data_source().to_string()),
            ("LOD Count", self.lod_count.to_string()),
            ("Nanite", if self.nanite_enabled { "Enabled" } else { "Disabled" }.to_string()),
            ("Texture Audit", self.texture_audit.clone()),
            ("Verdict", self.verdict.label().to_string()),
        ]
    }

    /// Render as a standalone HTML document
    pub fn render_html(&self) -> String {
        let mut rows = String::new();
        for (metric, value) in self.rows() {
            rows.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td></tr>\n",
                metric,
                escape_html(&value)
            ));
        }
        let color = if self.verdict.is_pass() { "#2e7d32" } else { "#c62828" };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Import Report: {name}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2em; }}
    table {{ border-collapse: collapse; }}
    td, th {{ border: 1px solid #999; padding: 4px 12px; }}
    .verdict {{ color: {color}; font-weight: bold; }}
  </style>
</head>
<body>
  <h1>Import Report: {name}</h1>
  <table>
    <thead><tr><th>Metric</th><th>Value</th></tr></thead>
    <tbody>
{rows}    </tbody>
  </table>
  <p class="verdict">{verdict}</p>
</body>
</html>
"#,
            name = escape_html(&self.asset_name),
            color = color,
            rows = rows,
            verdict = self.verdict.label(),
        )
    }
}

fn texture_audit(issues: Option<&[String]>) -> String {
    match issues {
        None => "Not audited".into(),
        Some([]) => "No issues".into(),
        Some(issues) => format!("{} issue(s): {}", issues.len(), issues.join(", ")),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
