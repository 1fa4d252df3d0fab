#![warn(missing_docs)]
//! Peer-to-peer room messaging.
//!
//! Peers never exchange terrain. Each builds its level from the shared room
//! seed and only broadcasts presence, positions and voxel damage deltas.

mod channel;
mod codec;
mod error;
mod link;
mod protocol;
mod transport;

pub use channel::ChannelType;
pub use codec::{compute_schema_hash, decode_message, encode_message, MAX_FRAME_LEN};
pub use error::NetError;
pub use link::{LinkStats, PeerLink};
pub use protocol::{
    PeerId, PeerMessage, SegmentRef, VoxelDamage, MAX_COORDINATE, PROTOCOL_MAGIC,
    PROTOCOL_VERSION,
};
pub use transport::{HubStats, Inbound, LoopbackHub, LoopbackPeer, Transport};

use serde::{Deserialize, Serialize};

/// Schema hash for on-the-wire compatibility checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SchemaHash(pub u64);

impl SchemaHash {
    /// Hash of the protocol this build speaks.
    pub fn current() -> Self {
        Self(compute_schema_hash())
    }

    /// Whether a peer announcing `other` speaks the same protocol.
    pub fn compatible_with(self, other: u64) -> bool {
        self.0 == other
    }
}
