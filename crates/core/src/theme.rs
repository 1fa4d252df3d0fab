//! Cosmetic terrain themes.
//!
//! The theme only changes brick colours. It is picked from keywords in the
//! sanitised room name, so every peer agrees on it without a message.

use serde::{Deserialize, Serialize};

/// Terrain colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Theme {
    /// Cave greys.
    #[default]
    Default = 0,
    /// White cloud bricks.
    Clouds = 1,
    /// Dark red / orange volcanic stone.
    Volcano = 2,
    /// Dark purple with occasional sparkles.
    Space = 3,
}

impl Theme {
    /// Select a theme from keywords in the room name (case-insensitive).
    pub fn from_room_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("clouds") {
            Self::Clouds
        } else if ["volcano", "lava", "fire"].iter().any(|k| lower.contains(k)) {
            Self::Volcano
        } else if ["space", "cosmic", "stars"].iter().any(|k| lower.contains(k)) {
            Self::Space
        } else {
            Self::Default
        }
    }

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Clouds => "clouds",
            Self::Volcano => "volcano",
            Self::Space => "space",
        }
    }
}
