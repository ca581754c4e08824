//! Packed 32-bit pixel colors.
//!
//! Pixels are stored as `0xAARRGGBB` so a frame buffer can be blitted
//! as-is by most windowing and terminal backends.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a `#rrggbb` / `#rrggbbaa` color string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Color must start with '#': {0}")]
    MissingHash(String),

    #[error("Color must have 6 or 8 hex digits: {0}")]
    BadLength(String),

    #[error("Invalid hex digits in color: {0}")]
    BadDigit(String),
}

/// A packed RGBA color.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color(pub u32);

impl Color {
    pub const ALPHA_OPAQUE: u8 = 0xFF;

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GREY: Color = Color::rgb(90, 90, 90);

    /// Opaque color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, Self::ALPHA_OPAQUE)
    }

    /// Color from 8-bit channels including alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Opaque color from unit-range float channels, clamped.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        Self::rgb(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Invert the RGB channels, keeping alpha.
    pub const fn negate(self) -> Self {
        Self(self.0 ^ 0x00FF_FFFF)
    }

    /// Interpolate between `self` (factor 0) and `other` (factor 1).
    pub fn mix(self, other: Color, factor: f64) -> Self {
        let t = factor.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self::rgba(
            lerp(self.r(), other.r()),
            lerp(self.g(), other.g()),
            lerp(self.b(), other.b()),
            lerp(self.a(), other.a()),
        )
    }

    /// Scale the RGB channels by `brightness`, saturating at 255.
    pub fn scale(self, brightness: f64) -> Self {
        let k = brightness.max(0.0);
        let channel = |c: u8| (c as f64 * k).round().min(255.0) as u8;
        Self::rgba(channel(self.r()), channel(self.g()), channel(self.b()), self.a())
    }

    /// Perceived brightness in [0, 1] (Rec. 601 weights).
    pub fn luminance(self) -> f64 {
        (0.299 * self.r() as f64 + 0.587 * self.g() as f64 + 0.114 * self.b() as f64) / 255.0
    }

    /// Grey level color.
    pub fn grey(level: u8) -> Self {
        Self::rgb(level, level, level)
    }
}

fn unit_to_byte(x: f64) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Color({})", String::from(*self))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.a() == Color::ALPHA_OPAQUE {
            format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                color.r(),
                color.g(),
                color.b(),
                color.a()
            )
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorParseError::BadLength(s.to_string()));
        }
        let raw = u32::from_str_radix(hex, 16)
            .map_err(|_| ColorParseError::BadDigit(s.to_string()))?;

        Ok(if hex.len() == 6 {
            Color(0xFF00_0000 | raw)
        } else {
            // rrggbbaa -> aarrggbb
            Color(raw.rotate_right(8))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let c = Color::rgba(10, 20, 30, 40);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (10, 20, 30, 40));
        assert_eq!(Color::RED.0, 0xFFFF_0000);
    }

    #[test]
    fn test_negate() {
        let c = Color::rgb(0, 128, 255);
        let n = c.negate();
        assert_eq!((n.r(), n.g(), n.b(), n.a()), (255, 127, 0, 255));
        assert_eq!(n.negate(), c);
    }

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(Color::BLACK.mix(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.mix(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(Color::BLACK.mix(Color::WHITE, 0.5), Color::grey(128));
    }

    #[test]
    fn test_scale_saturates() {
        let c = Color::rgb(100, 200, 50);
        assert_eq!(c.scale(0.5), Color::rgb(50, 100, 25));
        assert_eq!(c.scale(2.0), Color::rgb(200, 255, 100));
        assert_eq!(c.scale(-1.0), Color::BLACK);
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Color::BLACK.luminance(), 0.0);
        assert!((Color::WHITE.luminance() - 1.0).abs() < 1e-9);
        assert!(Color::GREEN.luminance() > Color::BLUE.luminance());
    }

    #[test]
    fn test_hex_round_trip_through_serde() {
        let json = serde_json::to_string(&Color::rgb(0x12, 0x34, 0x56)).unwrap();
        assert_eq!(json, "\"#123456\"");

        let c: Color = serde_json::from_str("\"#11223380\"").unwrap();
        assert_eq!(c, Color::rgba(0x11, 0x22, 0x33, 0x80));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("123456".parse::<Color>(), Err(ColorParseError::MissingHash(_))));
        assert!(matches!("#1234".parse::<Color>(), Err(ColorParseError::BadLength(_))));
        assert!(matches!("#zz2233".parse::<Color>(), Err(ColorParseError::BadDigit(_))));
    }
}
