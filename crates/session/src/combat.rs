//! Projectiles and their contact with walls.

use cavewar_net::PeerId;
use cavewar_physics::{Circle, CollisionCategory, CollisionEvent, StaticBodySet};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Wall damage of a plain bullet.
pub const BULLET_DAMAGE: f32 = 10.0;

/// Base projectile radius.
pub const PROJECTILE_RADIUS: f32 = 3.0;

/// Blast radius of a rocket.
pub const EXPLOSION_RADIUS: f32 = 120.0;

/// Rocket damage against players at the blast centre.
pub const ROCKET_PLAYER_DAMAGE: f32 = 30.0;

/// Rocket damage against walls at the blast centre.
pub const EXPLOSION_WALL_DAMAGE: f32 = ROCKET_PLAYER_DAMAGE * 2.0;

/// How a projectile affects terrain on contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Damages the wall it touches.
    Bullet {
        /// Damage dealt to a destructible wall.
        damage: f32,
    },
    /// Explodes on contact, damaging every wall in range.
    Rocket,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Peer that fired it.
    pub owner: PeerId,
    /// Terrain effect.
    pub kind: ProjectileKind,
    /// Current position.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
}

impl Projectile {
    /// Plain bullet with the default damage.
    pub fn bullet(owner: PeerId, position: Vec2) -> Self {
        Self {
            owner,
            kind: ProjectileKind::Bullet {
                damage: BULLET_DAMAGE,
            },
            position,
            radius: PROJECTILE_RADIUS,
        }
    }

    /// Rocket; its body is twice a bullet's radius.
    pub fn rocket(owner: PeerId, position: Vec2) -> Self {
        Self {
            owner,
            kind: ProjectileKind::Rocket,
            position,
            radius: PROJECTILE_RADIUS * 2.0,
        }
    }

    fn shape(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }
}

/// Collision-start events between projectiles and wall bodies.
///
/// The probe is the projectile's index in `projectiles`.
pub fn wall_contacts(
    physics: &StaticBodySet,
    projectiles: &[Projectile],
) -> Vec<CollisionEvent<usize>> {
    let mask = CollisionCategory::ORB.mask() & CollisionCategory::WALL;
    projectiles
        .iter()
        .enumerate()
        .flat_map(|(index, projectile)| physics.overlaps(index, &projectile.shape(), mask))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavewar_physics::{PhysicsWorld, Rect};

    #[test]
    fn contacts_only_report_walls() {
        let mut physics = StaticBodySet::new();
        let wall = physics.add_static_body(
            Rect::new(Vec2::new(100.0, 100.0), Vec2::new(64.0, 32.0)),
            CollisionCategory::WALL,
        );
        physics.add_static_body(
            Rect::new(Vec2::new(300.0, 100.0), Vec2::new(32.0, 32.0)),
            CollisionCategory::PICKUP,
        );
        let shots = [
            Projectile::bullet(1, Vec2::new(130.0, 100.0)),
            Projectile::bullet(1, Vec2::new(300.0, 100.0)),
            Projectile::rocket(2, Vec2::new(500.0, 500.0)),
        ];
        let contacts = wall_contacts(&physics, &shots);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].probe, 0);
        assert_eq!(contacts[0].body, wall);
    }
}
