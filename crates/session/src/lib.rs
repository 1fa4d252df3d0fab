#![warn(missing_docs)]
//! Room sessions: a peer's terrain, players and damage sync.
//!
//! Every peer builds its own terrain from the room name. Only locally owned
//! projectiles change terrain directly; everything else arrives as damage
//! deltas from the peer that fired.

pub mod combat;
pub mod players;
pub mod room;
pub mod sync;

pub use combat::{Projectile, ProjectileKind, BULLET_DAMAGE, EXPLOSION_RADIUS};
pub use players::{PlayerRegistry, PlayerState, CROUCH_SCALE, PLAYER_RADIUS};
pub use room::{Room, RoomStats, DEBRIS_DOMAIN};
