//! Peer message definitions.
//!
//! Terrain never crosses the wire: peers announce themselves, stream their
//! position and broadcast damage deltas against segments they built locally.
//! All messages use postcard serialization for compact binary encoding.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelType;

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u16 = 1;

/// Protocol magic bytes mixed into the schema hash.
pub const PROTOCOL_MAGIC: &[u8; 8] = b"CAVEWAR\x01";

/// Peer identifier assigned by the transport.
pub type PeerId = u32;

/// Largest coordinate accepted on the wire (world units).
pub const MAX_COORDINATE: f32 = 1.0e6;

/// Reference to a wall segment: deterministic id plus its identity rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SegmentRef {
    /// Deterministic segment id.
    pub id: u32,
    /// Centre x.
    pub x: f32,
    /// Centre y.
    pub y: f32,
    /// Full width.
    pub width: f32,
    /// Full height.
    pub height: f32,
}

impl SegmentRef {
    /// Validate identity fields.
    pub fn verify(&self) -> Result<(), &'static str> {
        let fields = [self.x, self.y, self.width, self.height];
        if fields.iter().any(|f| !f.is_finite()) {
            return Err("Segment identity is not finite");
        }
        if fields.iter().any(|f| f.abs() > MAX_COORDINATE) {
            return Err("Segment identity out of range");
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err("Segment size must be positive");
        }
        Ok(())
    }
}

/// Damage delta for one segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VoxelDamage {
    /// Peer whose projectile dealt the damage.
    pub source: PeerId,
    /// Target segment.
    pub segment: SegmentRef,
    /// Damage amount; values at or above the destroy sentinel force destruction.
    pub damage: f32,
}

impl VoxelDamage {
    /// Validate before applying to terrain.
    pub fn verify(&self) -> Result<(), &'static str> {
        self.segment.verify()?;
        if !self.damage.is_finite() {
            return Err("Damage is not finite");
        }
        if self.damage < 0.0 {
            return Err("Damage is negative");
        }
        Ok(())
    }
}

/// Messages exchanged between peers in a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PeerMessage {
    /// Announcement on joining a room.
    Join {
        /// Announcing peer.
        player: PeerId,
        /// Protocol version.
        version: u16,
        /// Schema hash of the sender's build.
        schema_hash: u64,
        /// Level seed the peer derived from the room name.
        seed: i32,
        /// Spawn x.
        x: f32,
        /// Spawn y.
        y: f32,
    },

    /// Periodic position update.
    PlayerState {
        /// Reporting peer.
        player: PeerId,
        /// Position x.
        x: f32,
        /// Position y.
        y: f32,
        /// Crouching shrinks the hitbox.
        crouching: bool,
    },

    /// Terrain damage delta.
    VoxelDamage(VoxelDamage),

    /// The peer left the room.
    Leave {
        /// Departing peer.
        player: PeerId,
    },
}

impl PeerMessage {
    /// Channel this message travels on.
    pub fn channel(&self) -> ChannelType {
        match self {
            PeerMessage::Join { .. } | PeerMessage::Leave { .. } => ChannelType::Presence,
            PeerMessage::PlayerState { .. } => ChannelType::PlayerState,
            PeerMessage::VoxelDamage(_) => ChannelType::VoxelDamage,
        }
    }

    /// Verify message is within acceptable bounds.
    pub fn verify(&self) -> Result<(), &'static str> {
        match self {
            PeerMessage::Join { x, y, .. } | PeerMessage::PlayerState { x, y, .. } => {
                if !x.is_finite() || !y.is_finite() {
                    return Err("Position is not finite");
                }
                if x.abs() > MAX_COORDINATE || y.abs() > MAX_COORDINATE {
                    return Err("Position out of range");
                }
            }
            PeerMessage::VoxelDamage(damage) => damage.verify()?,
            PeerMessage::Leave { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> SegmentRef {
        SegmentRef {
            id: 367,
            x: 240.0,
            y: 144.0,
            width: 96.0,
            height: 32.0,
        }
    }

    #[test]
    fn damage_validation() {
        let ok = VoxelDamage {
            source: 1,
            segment: segment(),
            damage: 10.0,
        };
        assert!(ok.verify().is_ok());
        assert!(VoxelDamage { damage: -1.0, ..ok }.verify().is_err());
        assert!(VoxelDamage {
            damage: f32::NAN,
            ..ok
        }
        .verify()
        .is_err());
        let bad_segment = SegmentRef {
            width: f32::INFINITY,
            ..segment()
        };
        assert!(VoxelDamage {
            segment: bad_segment,
            ..ok
        }
        .verify()
        .is_err());
    }

    #[test]
    fn message_channels() {
        assert_eq!(
            PeerMessage::Leave { player: 2 }.channel(),
            ChannelType::Presence
        );
        let damage = PeerMessage::VoxelDamage(VoxelDamage {
            source: 1,
            segment: segment(),
            damage: 9999.0,
        });
        assert_eq!(damage.channel().name(), "voxelDmg");
        assert!(damage.verify().is_ok());
    }

    #[test]
    fn positions_must_be_finite() {
        let msg = PeerMessage::PlayerState {
            player: 1,
            x: f32::NAN,
            y: 0.0,
            crouching: false,
        };
        assert_eq!(msg.verify(), Err("Position is not finite"));
    }
}
