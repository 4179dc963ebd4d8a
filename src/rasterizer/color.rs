//! Packed 16-bit RGB565 colour

use serde::{Deserialize, Serialize};

/// RGB565 colour (5 bits red, 6 bits green, 5 bits blue)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);
    pub const RED: Rgb565 = Rgb565(0xF800);
    pub const GREEN: Rgb565 = Rgb565(0x07E0);
    pub const BLUE: Rgb565 = Rgb565(0x001F);
    pub const YELLOW: Rgb565 = Rgb565(0xFFE0);
    pub const DARK_GREY: Rgb565 = Rgb565(0x7BEF);

    /// Pack 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgb565((((r as u16) & 0xF8) << 8) | (((g as u16) & 0xFC) << 3) | ((b as u16) >> 3))
    }

    /// Unpack to 8-bit channels (low bits zero)
    pub fn channels(self) -> (u8, u8, u8) {
        let c = self.0;
        (((c >> 11) << 3) as u8, (((c >> 5) & 0x3F) << 2) as u8, ((c & 0x1F) << 3) as u8)
    }

    /// Scale brightness by `factor` (0.0-1.0)
    pub fn darken(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let (r, g, b) = self.channels();
        Self::rgb(
            (r as f32 * f) as u8,
            (g as f32 * f) as u8,
            (b as f32 * f) as u8,
        )
    }

    /// Per-channel linear interpolation; endpoints are returned exactly
    pub fn lerp(self, other: Rgb565, t: f32) -> Self {
        if t <= 0.0 || self == other {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        let (r1, g1, b1) = self.channels();
        let (r2, g2, b2) = other.channels();
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Self::rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
    }

    /// Expand to RGBA bytes for the host display
    pub fn to_rgba(self) -> [u8; 4] {
        let (r, g, b) = self.channels();
        // replicate high bits so white stays 255
        [r | (r >> 5), g | (g >> 6), b | (b >> 5), 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_packing() {
        assert_eq!(Rgb565::rgb(255, 255, 255), Rgb565::WHITE);
        assert_eq!(Rgb565::rgb(255, 0, 0), Rgb565::RED);
        assert_eq!(Rgb565::rgb(0, 255, 0), Rgb565::GREEN);
        assert_eq!(Rgb565::rgb(0, 0, 255), Rgb565::BLUE);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb565::rgb(16, 200, 16);
        let b = Rgb565::rgb(180, 215, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        for t in [0.0, 0.25, 0.5, 0.99, 1.0, 3.0] {
            assert_eq!(a.lerp(a, t), a);
        }
    }

    #[test]
    fn test_lerp_midpoint() {
        let m = Rgb565::BLACK.lerp(Rgb565::WHITE, 0.5);
        let (r, g, b) = m.channels();
        assert!((120..=128).contains(&r));
        assert!((120..=128).contains(&g));
        assert!((120..=128).contains(&b));
    }

    #[test]
    fn test_darken() {
        assert_eq!(Rgb565::WHITE.darken(0.0), Rgb565::BLACK);
        assert_eq!(Rgb565::WHITE.darken(1.0), Rgb565::WHITE);
        assert_eq!(Rgb565::WHITE.to_rgba(), [255, 255, 255, 255]);
    }
}
