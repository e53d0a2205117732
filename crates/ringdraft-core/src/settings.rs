//! Course metadata: ring dimensions, bale sizes and editing defaults.
//!
//! This block travels with the document and is read by most placement
//! operations as ambient configuration.

use crate::entities::SegmentType;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Ring dimensions in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSize {
    pub width: f64,
    pub height: f64,
}

impl Default for RingSize {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 60.0,
        }
    }
}

impl RingSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The ring as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Which ring corner the grid labels count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridOrigin {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl GridOrigin {
    /// Origin sits on the right edge, so width changes grow to the left.
    pub fn is_right(self) -> bool {
        matches!(self, GridOrigin::TopRight | GridOrigin::BottomRight)
    }

    /// Origin sits on the bottom edge, so height changes grow upwards.
    pub fn is_bottom(self) -> bool {
        matches!(self, GridOrigin::BottomLeft | GridOrigin::BottomRight)
    }
}

/// Default bale dimensions shared by every bale without overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaleSize {
    /// Long side in feet. Footprint width when flat or tall.
    pub length: f64,
    /// Footprint depth when flat, footprint width as a pillar.
    pub width: f64,
    /// Footprint depth when tall or a pillar.
    pub height: f64,
}

impl Default for BaleSize {
    fn default() -> Self {
        Self {
            length: 3.0,
            width: 1.5,
            height: 1.0,
        }
    }
}

/// How strictly new positions are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Footprint must stay inside the ring.
    #[default]
    BoundsOnly,
    /// Footprint must stay inside the ring and must not overlap another bale
    /// on the same layer.
    BoundsAndObstruction,
}

/// Defaults applied to newly drawn walls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallDefaults {
    pub segment_type: SegmentType,
}

/// Trial details printed on exported maps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialInfo {
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub judge: String,
}

/// Metadata block of a course document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMeta {
    #[serde(default)]
    pub ring: RingSize,
    #[serde(default)]
    pub grid_origin: GridOrigin,
    #[serde(default)]
    pub bale: BaleSize,
    #[serde(default)]
    pub wall_defaults: WallDefaults,
    #[serde(default)]
    pub trial: TrialInfo,
    #[serde(default)]
    pub placement_policy: PlacementPolicy,
}

impl CourseMeta {
    /// Metadata for a ring of the given size, everything else default.
    pub fn with_ring(width: f64, height: f64) -> Self {
        Self {
            ring: RingSize::new(width, height),
            ..Self::default()
        }
    }

    /// Ring dimensions as a `Size`.
    pub fn ring_size(&self) -> Size {
        Size::new(self.ring.width, self.ring.height)
    }
}
