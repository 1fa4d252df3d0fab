//! Procedural brick textures for wall segments.
//!
//! Purely cosmetic. Colours are a hash of world position so every peer
//! renders the same bricks without storing anything.

use cavewar_core::Theme;

use crate::segment::SegmentIdentity;

/// Edge of one brick sub-tile in pixels.
pub const BRICK_SIZE: u32 = 8;

/// Pseudo-random value in `[0, 1)` for the brick whose top-left corner is at
/// `(x, y)`.
pub fn brick_noise(x: i32, y: i32) -> f64 {
    let hash = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
    let mixed = i64::from(hash) * 2_654_435_761;
    mixed.rem_euclid(1000) as f64 / 1000.0
}

/// Brick colour for a noise value under `theme`.
pub fn brick_color(theme: Theme, noise: f64) -> [u8; 3] {
    let span = |base: u8, range: f64| base + (noise * range).floor() as u8;
    match theme {
        Theme::Default => {
            let grey = span(60, 60.0);
            [grey, grey, grey]
        }
        Theme::Clouds => {
            let white = span(240, 15.0);
            [white, white, white]
        }
        Theme::Volcano => [span(80, 40.0), span(30, 30.0), span(20, 20.0)],
        Theme::Space if noise > 0.85 => {
            let sparkle = span(200, 55.0);
            [sparkle, sparkle, sparkle]
        }
        Theme::Space => [span(40, 30.0), span(30, 25.0), span(60, 40.0)],
    }
}

/// RGBA texture covering one segment. Mortar gaps are transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrickTexture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl BrickTexture {
    /// Render the texture for a segment.
    pub fn render(identity: &SegmentIdentity, theme: Theme) -> Self {
        let width = identity.width.max(0.0).round() as u32;
        let height = identity.height.max(0.0).round() as u32;
        let origin_x = identity.x.round() as i32;
        let origin_y = identity.y.round() as i32;
        let mut rgba = vec![0u8; (width * height * 4) as usize];

        let cols = width.div_ceil(BRICK_SIZE);
        let rows = height.div_ceil(BRICK_SIZE);
        for r in 0..rows {
            for c in 0..cols {
                let (vx, vy) = (c * BRICK_SIZE, r * BRICK_SIZE);
                let noise = brick_noise(origin_x + vx as i32, origin_y + vy as i32);
                let [red, green, blue] = brick_color(theme, noise);
                for py in vy..(vy + BRICK_SIZE - 1).min(height) {
                    for px in vx..(vx + BRICK_SIZE - 1).min(width) {
                        let idx = ((py * width + px) * 4) as usize;
                        rgba[idx..idx + 4].copy_from_slice(&[red, green, blue, 255]);
                    }
                }
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`; transparent outside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }
}
