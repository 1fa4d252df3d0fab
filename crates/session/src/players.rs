//! Player registry consulted by the regeneration occupancy gate.

use std::collections::BTreeMap;

use cavewar_net::PeerId;
use cavewar_physics::Circle;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Standing hitbox radius.
pub const PLAYER_RADIUS: f32 = 20.0;

/// Crouching shrinks the hitbox to this fraction.
pub const CROUCH_SCALE: f32 = 0.7;

/// Last known state of one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// World position.
    pub position: Vec2,
    /// Crouch flag.
    pub crouching: bool,
}

impl PlayerState {
    /// Standing player at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            crouching: false,
        }
    }

    /// Radius after the crouch scale.
    pub fn effective_radius(&self) -> f32 {
        if self.crouching {
            PLAYER_RADIUS * CROUCH_SCALE
        } else {
            PLAYER_RADIUS
        }
    }

    /// Circular hitbox.
    pub fn hitbox(&self) -> Circle {
        Circle::new(self.position, self.effective_radius())
    }
}

/// Local player plus every remote peer heard from.
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    local: PeerId,
    players: BTreeMap<PeerId, PlayerState>,
}

impl PlayerRegistry {
    /// Registry holding only the local player.
    pub fn new(local: PeerId, spawn: PlayerState) -> Self {
        let mut players = BTreeMap::new();
        players.insert(local, spawn);
        Self { local, players }
    }

    /// Local player's state.
    pub fn local(&self) -> Option<&PlayerState> {
        self.players.get(&self.local)
    }

    /// Look a player up.
    pub fn get(&self, id: PeerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    /// Insert or overwrite a player.
    pub fn upsert(&mut self, id: PeerId, state: PlayerState) {
        self.players.insert(id, state);
    }

    /// Forget a remote player. The local player cannot be removed.
    pub fn remove(&mut self, id: PeerId) -> Option<PlayerState> {
        if id == self.local {
            return None;
        }
        self.players.remove(&id)
    }

    /// Drop every remote player.
    pub fn clear_remote(&mut self) {
        let local = self.local;
        self.players.retain(|id, _| *id == local);
    }

    /// Number of players, local included.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Always false: the local player is never removed.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Hitboxes of every player, in id order.
    pub fn occupants(&self) -> Vec<Circle> {
        self.players.values().map(PlayerState::hitbox).collect()
    }
}
