#![warn(missing_docs)]
//! 2D physics primitives (rects, circles, collision categories) and the
//! static-body collaborator the terrain talks to.

mod bodies;

pub use bodies::{BodyHandle, CollisionEvent, PhysicsWorld, StaticBody, StaticBodySet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle stored as centre + full size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// World-space centre.
    pub center: Vec2,
    /// Full width/height.
    pub size: Vec2,
}

impl Rect {
    /// Create a rect from its centre and full size.
    pub fn new(center: Vec2, size: Vec2) -> Self {
        debug_assert!(size.x >= 0.0 && size.y >= 0.0);
        Self { center, size }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Tests intersection with another rect (touching edges count).
    pub fn intersects(&self, other: &Self) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }

    /// Tests whether `circle` overlaps the rect interior.
    ///
    /// A circle that only grazes an edge does not count.
    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        let closest = circle.center.clamp(self.min(), self.max());
        closest.distance_squared(circle.center) < circle.radius * circle.radius
    }

    /// Tests whether `point` lies inside or on the rect.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// Circle hitbox.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// World-space centre.
    pub center: Vec2,
    /// Radius in world units.
    pub radius: f32,
}

impl Circle {
    /// Create a circle.
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Collision categories attached to every body.
    pub struct CollisionCategory: u32 {
        const PLAYER = 0x0001;
        const ORB = 0x0002;
        const WALL = 0x0004;
        const PICKUP = 0x0008;
        const PARTICLE = 0x0010;
    }
}

impl CollisionCategory {
    /// Categories a body of this category collides with.
    ///
    /// Walls collide with everything; particles only with walls.
    pub fn mask(self) -> Self {
        if self.contains(Self::WALL) {
            Self::all()
        } else if self.contains(Self::PARTICLE) {
            Self::WALL
        } else if self.contains(Self::ORB) {
            Self::PLAYER | Self::WALL | Self::PICKUP
        } else {
            Self::PLAYER | Self::WALL | Self::PICKUP | Self::ORB
        }
    }
}

impl Default for CollisionCategory {
    fn default() -> Self {
        CollisionCategory::empty()
    }
}
