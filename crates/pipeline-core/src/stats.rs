//! Geometry statistics and complexity tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Polygon and vertex counts reported by 3ds Max for a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneObjectStats {
    pub polygons: u64,
    pub vertices: u64,
}

impl SceneObjectStats {
    pub fn new(polygons: u64, vertices: u64) -> Self {
        Self { polygons, vertices }
    }
}

/// Assumed memory cost of one vertex in the engine
pub const BYTES_PER_VERTEX: u64 = 100;

/// Measurements taken in Unreal after import
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredStats {
    pub triangles: u64,
    pub vertices: u64,
    /// Estimated from the vertex count, not read from the engine
    pub memory_mb: f64,
}

impl MeasuredStats {
    /// Attach a memory estimate of `vertices * BYTES_PER_VERTEX` to raw counts.
    ///
    /// This is a rough model, not the engine's own memory accounting.
    pub fn estimate(triangles: u64, vertices: u64) -> Self {
        let memory_bytes = vertices.saturating_mul(BYTES_PER_VERTEX);
        Self {
            triangles,
            vertices,
            memory_mb: memory_bytes as f64 / (1024.0 * 1024.0),
        }
    }
}

/// Coarse complexity bucket
///
/// At export time the tier is derived from the polygon count; at validation
/// time it is derived from estimated memory. The two scales are not
/// comparable and are kept separate on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl ComplexityTier {
    /// Polygons above this count are at least Medium
    pub const MEDIUM_POLYGONS: u64 = 10_000;
    /// Polygons above this count are High
    pub const HIGH_POLYGONS: u64 = 50_000;

    /// Classify by polygon count.
    ///
    /// Thresholds are applied in sequence and the later check overwrites the
    /// earlier one, so 60 000 polygons ends as High.
    pub fn from_polygons(polygons: u64) -> Self {
        let mut tier = ComplexityTier::Low;
        if polygons > Self::MEDIUM_POLYGONS {
            tier = ComplexityTier::Medium;
        }
        if polygons > Self::HIGH_POLYGONS {
            tier = ComplexityTier::High;
        }
        tier
    }

    /// Classify by estimated memory footprint in megabytes
    pub fn from_memory_mb(memory_mb: f64) -> Self {
        if memory_mb <= 1.0 {
            ComplexityTier::Low
        } else if memory_mb <= 5.0 {
            ComplexityTier::Medium
        } else if memory_mb <= 20.0 {
            ComplexityTier::High
        } else {
            ComplexityTier::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "Low",
            ComplexityTier::Medium => "Medium",
            ComplexityTier::High => "High",
            ComplexityTier::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_thresholds() {
        assert_eq!(ComplexityTier::from_polygons(0), ComplexityTier::Low);
        assert_eq!(ComplexityTier::from_polygons(10_000), ComplexityTier::Low);
        assert_eq!(ComplexityTier::from_polygons(10_001), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_polygons(50_000), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_polygons(50_001), ComplexityTier::High);
        assert_eq!(ComplexityTier::from_polygons(60_000), ComplexityTier::High);
    }

    #[test]
    fn test_polygon_scale_never_reaches_very_high() {
        assert_eq!(ComplexityTier::from_polygons(u64::MAX), ComplexityTier::High);
    }

    #[test]
    fn test_memory_thresholds() {
        assert_eq!(ComplexityTier::from_memory_mb(0.7), ComplexityTier::Low);
        assert_eq!(ComplexityTier::from_memory_mb(1.0), ComplexityTier::Low);
        assert_eq!(ComplexityTier::from_memory_mb(1.01), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_memory_mb(5.0), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_memory_mb(20.0), ComplexityTier::High);
        assert_eq!(ComplexityTier::from_memory_mb(20.5), ComplexityTier::VeryHigh);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&ComplexityTier::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");

        let tier: ComplexityTier = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(tier, ComplexityTier::Medium);
    }

    #[test]
    fn test_memory_estimate() {
        let stats = MeasuredStats::estimate(7306, 3655);
        assert_eq!(stats.triangles, 7306);
        assert!((stats.memory_mb - 0.3486).abs() < 0.0001);
        assert_eq!(ComplexityTier::from_memory_mb(stats.memory_mb), ComplexityTier::Low);

        // 20 MB boundary sits at 209 716 vertices
        assert_eq!(
            ComplexityTier::from_memory_mb(MeasuredStats::estimate(0, 209_715).memory_mb),
            ComplexityTier::High
        );
        assert_eq!(
            ComplexityTier::from_memory_mb(MeasuredStats::estimate(0, 209_716).memory_mb),
            ComplexityTier::VeryHigh
        );
    }

    #[test]
    fn test_ordering() {
        assert!(ComplexityTier::Low < ComplexityTier::Medium);
        assert!(ComplexityTier::High < ComplexityTier::VeryHigh);
    }
}
