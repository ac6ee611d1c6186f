//! RGB colors as supplied by the customization UI.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a color string is not `#rgb`, `#rrggbb` or `hsl(...)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized color '{0}'")]
pub struct ParseColorError(pub String);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Convert an HSL triple (hue in degrees, saturation and lightness in percent).
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = to_channel(l);
            return Self::new(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Self::new(
            to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_channel(hue_to_rgb(p, q, h)),
            to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Channels as floats in `0..=1` (sRGB encoded).
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Channels converted to linear light, for PBR material factors.
    pub fn to_linear(self) -> [f32; 3] {
        self.to_f32().map(srgb_to_linear)
    }

    /// RGBA in sRGB space, opaque.
    pub fn to_rgba(self) -> [f32; 4] {
        let [r, g, b] = self.to_f32();
        [r, g, b, 1.0]
    }

    /// RGBA vertex color in linear space, opaque.
    pub fn to_linear_rgba(self) -> [f32; 4] {
        let [r, g, b] = self.to_linear();
        [r, g, b, 1.0]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(body) = trimmed
            .strip_prefix("hsl(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            parse_hsl(body)
        } else {
            None
        };
        parsed.ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(Rgb::from_hex),
        3 => {
            // #abc expands to #aabbcc
            let digits: Vec<u8> = hex
                .chars()
                .filter_map(|c| c.to_digit(16))
                .map(|d| (d * 17) as u8)
                .collect();
            Some(Rgb::new(digits[0], digits[1], digits[2]))
        }
        _ => None,
    }
}

fn parse_hsl(body: &str) -> Option<Rgb> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let hue: f32 = parts[0].trim_end_matches("deg").parse().ok()?;
    let saturation: f32 = parts[1].strip_suffix('%')?.trim().parse().ok()?;
    let lightness: f32 = parts[2].strip_suffix('%')?.trim().parse().ok()?;
    if !(hue.is_finite() && saturation.is_finite() && lightness.is_finite()) {
        return None;
    }
    Some(Rgb::from_hsl(hue, saturation, lightness))
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Inverse of the sRGB transfer function, for formats that store display colors.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
