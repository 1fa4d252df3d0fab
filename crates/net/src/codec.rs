//! Message encoding and decoding with framing.
//!
//! Frame format: `[length: u32 LE][channel tag: u8][postcard payload]`, where
//! the length covers the tag and payload.

use blake3::Hash;
use tracing::trace;

use crate::channel::ChannelType;
use crate::protocol::{PeerMessage, PROTOCOL_MAGIC, PROTOCOL_VERSION};
use crate::NetError;

/// Largest frame body accepted (tag + payload).
pub const MAX_FRAME_LEN: usize = 1024;

const HEADER_LEN: usize = 5;

/// Compute schema hash from protocol definitions.
///
/// Peers built from different protocol revisions disagree on this value.
pub fn compute_schema_hash() -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&PROTOCOL_VERSION.to_le_bytes());
    hasher.update(PROTOCOL_MAGIC);
    for name in [
        "PeerMessage",
        "Join",
        "PlayerState",
        "VoxelDamage",
        "Leave",
        "SegmentRef",
    ] {
        hasher.update(name.as_bytes());
    }
    for channel in ChannelType::ALL {
        hasher.update(channel.name().as_bytes());
    }
    let hash: Hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Encode a peer message with length prefix.
pub fn encode_message(msg: &PeerMessage) -> Result<Vec<u8>, NetError> {
    let payload = postcard::to_allocvec(msg)?;
    let length = 1 + payload.len();
    if length > MAX_FRAME_LEN {
        return Err(NetError::Oversize {
            len: length,
            max: MAX_FRAME_LEN,
        });
    }

    let mut frame = Vec::with_capacity(4 + length);
    frame.extend_from_slice(&(length as u32).to_le_bytes());
    frame.push(msg.channel() as u8);
    frame.extend_from_slice(&payload);
    trace!(bytes = frame.len(), channel = msg.channel().name(), "encoded frame");
    Ok(frame)
}

/// Decode a peer message from frame data.
///
/// Expects data to start with the length prefix. Trailing bytes after the
/// frame are ignored.
pub fn decode_message(data: &[u8]) -> Result<PeerMessage, NetError> {
    if data.len() < HEADER_LEN {
        return Err(NetError::FrameTooShort { len: data.len() });
    }

    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if length == 0 || length > MAX_FRAME_LEN {
        return Err(NetError::Oversize {
            len: length,
            max: MAX_FRAME_LEN,
        });
    }
    if data.len() < 4 + length {
        return Err(NetError::IncompleteFrame {
            expected: 4 + length,
            actual: data.len(),
        });
    }

    let channel = ChannelType::try_from(data[4])?;
    let msg: PeerMessage = postcard::from_bytes(&data[HEADER_LEN..4 + length])?;
    if msg.channel() != channel {
        return Err(NetError::ChannelMismatch {
            tag: channel.name(),
            message: msg.channel().name(),
        });
    }
    Ok(msg)
}
