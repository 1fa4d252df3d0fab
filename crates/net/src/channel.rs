//! Named broadcast channels.

use serde::{Deserialize, Serialize};

use crate::NetError;

/// Channel type identifier for message routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelType {
    /// Join/leave announcements (reliable).
    Presence = 0,
    /// Position streaming (unreliable, latest wins).
    PlayerState = 1,
    /// Terrain damage deltas (unreliable, no retry).
    VoxelDamage = 2,
}

impl ChannelType {
    /// Every channel, in tag order.
    pub const ALL: [ChannelType; 3] = [
        ChannelType::Presence,
        ChannelType::PlayerState,
        ChannelType::VoxelDamage,
    ];

    /// Check if this channel type should use reliable delivery.
    pub fn is_reliable(&self) -> bool {
        matches!(self, ChannelType::Presence)
    }

    /// Check if this channel type should use unreliable delivery.
    pub fn is_unreliable(&self) -> bool {
        !self.is_reliable()
    }

    /// Channel name used by the transport.
    pub const fn name(self) -> &'static str {
        match self {
            ChannelType::Presence => "presence",
            ChannelType::PlayerState => "playerState",
            ChannelType::VoxelDamage => "voxelDmg",
        }
    }
}

impl TryFrom<u8> for ChannelType {
    type Error = NetError;

    fn try_from(value: u8) -> Result<Self, NetError> {
        match value {
            0 => Ok(ChannelType::Presence),
            1 => Ok(ChannelType::PlayerState),
            2 => Ok(ChannelType::VoxelDamage),
            _ => Err(NetError::UnknownTag(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip() {
        for channel in ChannelType::ALL {
            assert_eq!(ChannelType::try_from(channel as u8).ok(), Some(channel));
        }
        assert!(ChannelType::try_from(9).is_err());
    }

    #[test]
    fn only_presence_is_reliable() {
        assert!(ChannelType::Presence.is_reliable());
        assert!(ChannelType::VoxelDamage.is_unreliable());
        assert!(ChannelType::PlayerState.is_unreliable());
    }
}
