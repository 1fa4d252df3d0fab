use cavewar_core::Theme;
use cavewar_physics::{BodyHandle, Rect};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance (world units, per field) for cross-peer identity matching.
pub const IDENTITY_TOLERANCE: f32 = 1.0;

/// Deterministic segment id: `row * grid_width + column_start` for grid
/// segments, ids past the grid for the frame walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl SegmentId {
    /// Id of the run starting at `(column, row)`.
    pub fn from_grid(row: usize, column: usize, grid_width: usize) -> Self {
        Self((row * grid_width + column) as u32)
    }
}

/// Position and size of a segment, used to match it across peers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentIdentity {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SegmentIdentity {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when every field is within `tolerance` of `other`.
    pub fn matches(&self, other: &Self, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }

    /// Bounds as a physics rect.
    pub fn rect(&self) -> Rect {
        Rect::new(
            Vec2::new(self.x, self.y),
            Vec2::new(self.width, self.height),
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// All four fields are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Destructibility of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Touches the outer ring or frames the map. Never damaged.
    Boundary,
    /// Interior voxel with hit points.
    Destructible { health: f32, max_health: f32 },
}

/// A live wall segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub identity: SegmentIdentity,
    pub kind: SegmentKind,
    pub theme: Theme,
    /// Static body in the physics collaborator, once inserted.
    pub body: Option<BodyHandle>,
}

impl Segment {
    pub fn boundary(id: SegmentId, identity: SegmentIdentity, theme: Theme) -> Self {
        Self {
            id,
            identity,
            kind: SegmentKind::Boundary,
            theme,
            body: None,
        }
    }

    pub fn destructible(
        id: SegmentId,
        identity: SegmentIdentity,
        theme: Theme,
        max_health: f32,
    ) -> Self {
        Self {
            id,
            identity,
            kind: SegmentKind::Destructible {
                health: max_health,
                max_health,
            },
            theme,
            body: None,
        }
    }

    #[inline]
    pub fn is_voxel(&self) -> bool {
        matches!(self.kind, SegmentKind::Destructible { .. })
    }

    /// Current health, `None` for boundary segments.
    pub fn health(&self) -> Option<f32> {
        match self.kind {
            SegmentKind::Destructible { health, .. } => Some(health),
            SegmentKind::Boundary => None,
        }
    }
}
