//! Named palettes and palette randomization.

use super::{ComponentId, Palette};
use crate::error::ConfigurationError;
use crate::types::Rgb;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// A named color bundle offered by the customizer's preset menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Classic,
    Simple,
    Rustic,
    Ornate,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Classic, Preset::Simple, Preset::Rustic, Preset::Ornate];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Simple => "simple",
            Preset::Rustic => "rustic",
            Preset::Ornate => "ornate",
        }
    }

    /// Colors in [`ComponentId::ALL`] order.
    pub fn palette(&self) -> Palette {
        let hex = match self {
            Preset::Classic => [0x513520, 0x8B4513, 0xffd700, 0x513520, 0x513520, 0x513520],
            Preset::Simple => [0x222222, 0xA9A9A9, 0xC0C0C0, 0xDAA520, 0xC0C0C0, 0xB87333],
            Preset::Rustic => [0x8B4513, 0xDEB887, 0xCD853F, 0x556B2F, 0x8B7355, 0xA0522D],
            Preset::Ornate => [0x4B0082, 0xFFFFF0, 0xDAA520, 0xDC143C, 0x4169E1, 0x8B008B],
        };
        Palette::new(hex.map(Rgb::from_hex))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownPreset(s.to_string()))
    }
}

/// Random muted color: any hue, 40-70% saturation, 20-50% lightness.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let hue = rng.random_range(0..360) as f32;
    let saturation = rng.random_range(40..70) as f32;
    let lightness = rng.random_range(20..50) as f32;
    Rgb::from_hsl(hue, saturation, lightness)
}

/// Draw an independent random color for every component.
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> Palette {
    let mut palette = Palette::default();
    for id in ComponentId::ALL {
        palette.set(id, random_color(rng));
    }
    palette
}
