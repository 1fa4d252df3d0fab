//! Room name → level seed.
//!
//! No terrain and no seed ever cross the wire: every peer types (or is handed)
//! the same room name, sanitises it, and hashes it here. Two names that
//! sanitise identically always produce the same seed.

use rand::Rng;
use serde::{Deserialize, Serialize};

const LENGTH_MIX: u32 = 73_856_093;
const FALLBACK_PREFIX: &str = "room";
const FALLBACK_SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A sanitised room name together with its derived seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSeed {
    /// Sanitised room name (alphanumeric, `_`, `-`).
    pub name: String,
    /// Non-zero level seed.
    pub seed: i32,
}

impl RoomSeed {
    /// Sanitise `raw` and hash the result.
    pub fn derive(raw: &str) -> Self {
        let name = sanitize_room_name(raw);
        let seed = hash_room_name(&name);
        Self { name, seed }
    }
}

/// Derive the level seed for a raw (unsanitised) room name.
pub fn derive_seed(raw: &str) -> i32 {
    RoomSeed::derive(raw).seed
}

/// Strip everything outside `[A-Za-z0-9_-]`.
///
/// An empty result is replaced by a random `room??????` name. That branch is
/// deliberately non-deterministic: it only serves solo rooms nobody else can
/// name anyway.
pub fn sanitize_room_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if !cleaned.is_empty() {
        return cleaned;
    }
    let mut rng = rand::thread_rng();
    let suffix: String = (0..FALLBACK_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{FALLBACK_PREFIX}{suffix}")
}

/// Hash an already-sanitised room name with 32-bit wraparound semantics.
pub fn hash_room_name(name: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in name.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
        hash = hash.wrapping_add(hash << 15);
        hash ^= hash >> 7;
    }
    let length_mix = (name.encode_utf16().count() as u32).wrapping_mul(LENGTH_MIX) as i32;
    match hash.wrapping_abs().wrapping_add(length_mix) {
        0 => 1,
        seed => seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_stable_for_same_name() {
        assert_eq!(derive_seed("Arena1"), derive_seed("Arena1"));
    }

    #[test]
    fn neighbouring_names_differ() {
        assert_ne!(derive_seed("Arena1"), derive_seed("Arena2"));
    }

    #[test]
    fn reference_values() {
        assert_eq!(hash_room_name("Arena1"), 1_986_213_057);
        assert_eq!(hash_room_name("Arena2"), 1_984_987_070);
        assert_eq!(hash_room_name("room1"), 1_067_059_241);
        assert_eq!(hash_room_name("a"), 77_059_518);
    }

    #[test]
    fn long_names_wrap_instead_of_overflowing() {
        let name = "Z".repeat(40);
        assert_eq!(hash_room_name(&name), 165_747_245);
    }

    #[test]
    fn sanitising_strips_disallowed_characters() {
        assert_eq!(sanitize_room_name("  my room!#42 "), "myroom42");
        assert_eq!(sanitize_room_name("lava_pit-2"), "lava_pit-2");
        assert_eq!(derive_seed("my room!#42"), derive_seed("myroom42"));
    }

    #[test]
    fn empty_name_gets_random_fallback() {
        let name = sanitize_room_name("!!!");
        assert!(name.starts_with(FALLBACK_PREFIX));
        assert_eq!(name.len(), FALLBACK_PREFIX.len() + FALLBACK_SUFFIX_LEN);
        assert_ne!(hash_room_name(&name), 0);
    }

    #[test]
    fn seed_is_never_zero() {
        for name in ["", "a", "b", "room1", "x-y_z"] {
            assert_ne!(hash_room_name(name), 0);
        }
    }
}
