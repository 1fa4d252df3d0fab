//! Fuzz-style property tests for the peer codec
//!
//! These tests validate that the decoder handles arbitrary network input
//! gracefully without crashing, and that valid damage deltas survive framing.

use cavewar_net::{
    decode_message, encode_message, PeerMessage, SegmentRef, VoxelDamage, PROTOCOL_VERSION,
};
use proptest::prelude::*;

proptest! {
    /// Property: Arbitrary bytes don't crash the decoder
    #[test]
    fn arbitrary_bytes_dont_crash(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let _result = decode_message(&random_bytes);
        // No panic = success
    }

    /// Property: A valid length prefix over random payload doesn't crash
    #[test]
    fn framed_garbage_dont_crash(
        tag in 0u8..4,
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut frame = ((payload.len() + 1) as u32).to_le_bytes().to_vec();
        frame.push(tag);
        frame.extend_from_slice(&payload);
        if let Ok(msg) = decode_message(&frame) {
            prop_assert_eq!(msg.channel() as u8, tag);
        }
    }

    /// Property: Join announcements roundtrip
    #[test]
    fn join_roundtrips(
        player in any::<u32>(),
        seed in any::<i32>(),
        schema_hash in any::<u64>(),
        x in -4000.0f32..4000.0,
        y in -4000.0f32..4000.0,
    ) {
        let msg = PeerMessage::Join {
            player,
            version: PROTOCOL_VERSION,
            schema_hash,
            seed,
            x,
            y,
        };

        let encoded = encode_message(&msg).unwrap();
        let decoded = decode_message(&encoded).unwrap();

        prop_assert_eq!(msg, decoded);
    }

    /// Property: Damage deltas roundtrip and stay valid
    #[test]
    fn voxel_damage_roundtrips(
        source in any::<u32>(),
        id in any::<u32>(),
        x in 0.0f32..3840.0,
        y in 0.0f32..2160.0,
        width in 32.0f32..3840.0,
        damage in 0.0f32..10_000.0,
    ) {
        let msg = PeerMessage::VoxelDamage(VoxelDamage {
            source,
            segment: SegmentRef { id, x, y, width, height: 32.0 },
            damage,
        });

        let encoded = encode_message(&msg).unwrap();
        let decoded = decode_message(&encoded).unwrap();

        prop_assert!(decoded.verify().is_ok());
        prop_assert_eq!(msg, decoded);
    }

    /// Property: Truncating a frame never decodes to a message
    #[test]
    fn truncated_frames_are_rejected(
        id in any::<u32>(),
        cut in 0usize..20,
    ) {
        let msg = PeerMessage::VoxelDamage(VoxelDamage {
            source: 1,
            segment: SegmentRef { id, x: 16.0, y: 16.0, width: 32.0, height: 32.0 },
            damage: 10.0,
        });
        let encoded = encode_message(&msg).unwrap();
        let cut = cut.min(encoded.len() - 1);
        prop_assert!(decode_message(&encoded[..cut]).is_err());
    }
}
