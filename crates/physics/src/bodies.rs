use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Circle, CollisionCategory, Rect};

/// Stable handle to a body owned by a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// A static (immovable) body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBody {
    /// Body bounds.
    pub rect: Rect,
    /// Category bits of this body.
    pub category: CollisionCategory,
}

/// Collision-start pair between a moving probe and a static body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent<P> {
    /// Caller-side identifier of the moving body (projectile, player, ...).
    pub probe: P,
    /// The static body that was hit.
    pub body: BodyHandle,
}

/// Collaborator interface for the physics engine hosting the terrain.
///
/// The terrain only ever creates and removes static bodies; broad and narrow
/// phase belong to the implementation.
pub trait PhysicsWorld {
    /// Insert a static body and return its handle.
    fn add_static_body(&mut self, rect: Rect, category: CollisionCategory) -> BodyHandle;

    /// Remove a body. Returns `false` when the handle was unknown.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Remove every body (room teardown).
    fn clear(&mut self);

    /// Number of bodies currently alive.
    fn body_count(&self) -> usize;
}

/// In-memory static body store with brute-force circle queries.
#[derive(Debug, Default)]
pub struct StaticBodySet {
    bodies: BTreeMap<BodyHandle, StaticBody>,
    next_handle: u32,
}

impl StaticBodySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a body.
    pub fn get(&self, handle: BodyHandle) -> Option<&StaticBody> {
        self.bodies.get(&handle)
    }

    /// Iterate bodies in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &StaticBody)> {
        self.bodies.iter().map(|(h, b)| (*h, b))
    }

    /// Collision events for a circle probe against every body whose category
    /// is in `mask`.
    pub fn overlaps<P: Copy>(
        &self,
        probe: P,
        circle: &Circle,
        mask: CollisionCategory,
    ) -> Vec<CollisionEvent<P>> {
        self.bodies
            .iter()
            .filter(|(_, body)| mask.intersects(body.category))
            .filter(|(_, body)| body.rect.intersects_circle(circle))
            .map(|(handle, _)| CollisionEvent {
                probe,
                body: *handle,
            })
            .collect()
    }
}

impl PhysicsWorld for StaticBodySet {
    fn add_static_body(&mut self, rect: Rect, category: CollisionCategory) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.bodies.insert(handle, StaticBody { rect, category });
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(&handle).is_some()
    }

    fn clear(&mut self) {
        self.bodies.clear();
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn add_remove_roundtrip() {
        let mut set = StaticBodySet::new();
        let rect = Rect::new(Vec2::new(16.0, 16.0), Vec2::splat(32.0));
        let a = set.add_static_body(rect, CollisionCategory::WALL);
        let b = set.add_static_body(rect, CollisionCategory::WALL);
        assert_ne!(a, b);
        assert_eq!(set.body_count(), 2);
        assert!(set.remove_body(a));
        assert!(!set.remove_body(a));
        assert_eq!(set.body_count(), 1);
        set.clear();
        assert_eq!(set.body_count(), 0);
    }

    #[test]
    fn handles_are_not_reused_after_removal() {
        let mut set = StaticBodySet::new();
        let rect = Rect::new(Vec2::ZERO, Vec2::splat(1.0));
        let a = set.add_static_body(rect, CollisionCategory::WALL);
        set.remove_body(a);
        let b = set.add_static_body(rect, CollisionCategory::WALL);
        assert_ne!(a, b);
    }

    #[test]
    fn overlaps_respects_mask() {
        let mut set = StaticBodySet::new();
        let wall = set.add_static_body(
            Rect::new(Vec2::new(16.0, 16.0), Vec2::splat(32.0)),
            CollisionCategory::WALL,
        );
        set.add_static_body(
            Rect::new(Vec2::new(16.0, 16.0), Vec2::splat(32.0)),
            CollisionCategory::PICKUP,
        );
        let probe = Circle::new(Vec2::new(20.0, 20.0), 4.0);
        let hits = set.overlaps(7u32, &probe, CollisionCategory::WALL);
        assert_eq!(
            hits,
            vec![CollisionEvent {
                probe: 7,
                body: wall
            }]
        );
    }
}
