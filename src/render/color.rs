//! RGBA colors and the built-in palette

use serde::{Deserialize, Serialize};

use crate::lerp;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const DARK_GRAY: Self = Self::new(28, 28, 28, 255);
    pub const GRAY: Self = Self::new(96, 96, 96, 255);
    pub const LIGHT_GRAY: Self = Self::new(179, 179, 179, 255);

    pub const RED: Self = Self::new(255, 0, 0, 255);
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);

    pub const ORANGE: Self = Self::new(255, 127, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);
    pub const LIME: Self = Self::new(127, 255, 0, 255);
    pub const VIVID_GREEN: Self = Self::new(0, 255, 127, 255);
    pub const AQUA: Self = Self::new(0, 255, 255, 255);
    pub const AZURE: Self = Self::new(0, 127, 255, 255);
    pub const VIOLET: Self = Self::new(127, 0, 255, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255, 255);
    pub const VIVID_PINK: Self = Self::new(255, 0, 127, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Per-channel linear blend, truncated to 8 bits
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let channel = |a: u8, b: u8| lerp(a as f32, b as f32, t).clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: channel(self.a, other.a),
        }
    }

    /// Normalized `[r, g, b, a]` for presenters that want floats
    pub fn to_array_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_alpha_keeps_rgb() {
        let c = Color::ORANGE.with_alpha(10);
        assert_eq!(c, Color::new(255, 127, 0, 10));
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.5), Color::new(127, 127, 127, 255));
    }
}
