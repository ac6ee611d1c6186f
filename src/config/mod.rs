//! Book customization model.
//!
//! [`BookConfigInput`] is the loosely-typed shape the UI sends (camelCase JSON,
//! colors as strings). [`BookConfigInput::validate`] turns it into an immutable
//! [`BookConfig`], which is what the layout engine consumes.

pub mod presets;

pub use presets::Preset;

use crate::error::{ConfigurationError, Result};
use crate::types::Rgb;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default number of pages in the book block.
pub const DEFAULT_PAGE_COUNT: u32 = 100;

/// Largest accepted page count. Each page is one primitive, so this bounds
/// layout, spring and mesh sizes for any input the UI can send.
pub const MAX_PAGE_COUNT: u32 = 10_000;

/// A colorable part of the book, as named by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentId {
    OuterLeather,
    InnerLeather,
    Guilding,
    Ribbon1,
    Ribbon2,
    Ribbon3,
}

impl ComponentId {
    /// Every component id, in palette order.
    pub const ALL: [ComponentId; 6] = [
        ComponentId::OuterLeather,
        ComponentId::InnerLeather,
        ComponentId::Guilding,
        ComponentId::Ribbon1,
        ComponentId::Ribbon2,
        ComponentId::Ribbon3,
    ];

    /// The wire name used by the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentId::OuterLeather => "outer-leather",
            ComponentId::InnerLeather => "inner-leather",
            ComponentId::Guilding => "guilding",
            ComponentId::Ribbon1 => "ribbon-1",
            ComponentId::Ribbon2 => "ribbon-2",
            ComponentId::Ribbon3 => "ribbon-3",
        }
    }

    /// Ribbon component for a 1-based ribbon number.
    pub fn ribbon(number: usize) -> Option<Self> {
        match number {
            1 => Some(ComponentId::Ribbon1),
            2 => Some(ComponentId::Ribbon2),
            3 => Some(ComponentId::Ribbon3),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentId {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ComponentId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or(())
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One color per [`ComponentId`]. Always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 6],
}

impl Palette {
    /// Build a palette from colors given in [`ComponentId::ALL`] order.
    pub const fn new(colors: [Rgb; 6]) -> Self {
        Self { colors }
    }

    /// Parse a UI color map. Unknown keys are ignored; every known id must be present.
    pub fn from_map(
        map: &BTreeMap<String, String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut colors = [Rgb::default(); 6];
        for id in ComponentId::ALL {
            let value = map
                .get(id.as_str())
                .ok_or(ConfigurationError::MissingColor(id))?;
            colors[id.index()] = value.parse().map_err(|_| ConfigurationError::InvalidColor {
                component: id,
                value: value.clone(),
            })?;
        }
        Ok(Self { colors })
    }

    pub fn get(&self, id: ComponentId) -> Rgb {
        self.colors[id.index()]
    }

    pub fn set(&mut self, id: ComponentId, color: Rgb) {
        self.colors[id.index()] = color;
    }

    pub fn with(mut self, id: ComponentId, color: Rgb) -> Self {
        self.set(id, color);
        self
    }

    /// Colors as a UI-shaped string map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        ComponentId::ALL
            .into_iter()
            .map(|id| (id.as_str().to_string(), self.get(id).to_string()))
            .collect()
    }
}

impl Default for Palette {
    /// The customizer's initial colors: oxblood leather, tan liner, gold edges.
    fn default() -> Self {
        Self::new([
            Rgb::from_hex(0x722F37),
            Rgb::from_hex(0xd2b48c),
            Rgb::from_hex(0xffd700),
            Rgb::from_hex(0x2D5A3A),
            Rgb::from_hex(0xFFFFF0),
            Rgb::from_hex(0x1B4B82),
        ])
    }
}

impl Serialize for Palette {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// Cover overhang beyond the page block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YapSize {
    #[default]
    Standard,
    Half,
    Full,
}

impl YapSize {
    pub const ALL: [YapSize; 3] = [YapSize::Standard, YapSize::Half, YapSize::Full];

    /// Extra cover length in world units.
    pub fn offset(&self) -> f32 {
        match self {
            YapSize::Standard => 0.0,
            YapSize::Half => 0.2,
            YapSize::Full => 0.4,
        }
    }

    /// Parse a yap size, falling back to `Standard` for anything unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "standard" => YapSize::Standard,
            "half" => YapSize::Half,
            "full" => YapSize::Full,
            other => {
                log::warn!("Unrecognized yap size '{}', using standard", other);
                YapSize::Standard
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YapSize::Standard => "standard",
            YapSize::Half => "half",
            YapSize::Full => "full",
        }
    }
}

/// Which scene is built. The two are structurally different layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewVariant {
    #[default]
    Closed,
    Open,
}

impl FromStr for ViewVariant {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "closed" => Ok(ViewVariant::Closed),
            "open" => Ok(ViewVariant::Open),
            other => Err(ConfigurationError::UnknownViewVariant(other.to_string())),
        }
    }
}

/// Configuration as delivered by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookConfigInput {
    /// Component id to color string (`#rrggbb`, `#rgb` or `hsl(h, s%, l%)`).
    /// Absent or empty selects the preset, or the default palette without one.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    /// Optional named preset supplying base colors; entries in `colors` override it.
    pub preset: Option<String>,
    pub yap_size: String,
    pub page_count: i64,
    pub view_variant: String,
    pub is_exploded: bool,
}

impl Default for BookConfigInput {
    fn default() -> Self {
        Self {
            colors: Palette::default().to_map(),
            preset: None,
            yap_size: YapSize::Standard.as_str().to_string(),
            page_count: DEFAULT_PAGE_COUNT as i64,
            view_variant: "closed".to_string(),
            is_exploded: false,
        }
    }
}

impl BookConfigInput {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate into a [`BookConfig`].
    pub fn validate(&self) -> std::result::Result<BookConfig, ConfigurationError> {
        if self.page_count < 1 || self.page_count > MAX_PAGE_COUNT as i64 {
            return Err(ConfigurationError::InvalidPageCount(self.page_count));
        }
        let view_variant: ViewVariant = self.view_variant.parse()?;

        let palette = match &self.preset {
            Some(name) => {
                let mut palette = name.parse::<Preset>()?.palette();
                for id in ComponentId::ALL {
                    if let Some(value) = self.colors.get(id.as_str()) {
                        let color = value.parse().map_err(|_| ConfigurationError::InvalidColor {
                            component: id,
                            value: value.clone(),
                        })?;
                        palette.set(id, color);
                    }
                }
                palette
            }
            None if self.colors.is_empty() => Palette::default(),
            None => Palette::from_map(&self.colors)?,
        };

        Ok(BookConfig {
            palette,
            yap_size: YapSize::parse_lenient(&self.yap_size),
            page_count: self.page_count as u32,
            view_variant,
            exploded: self.is_exploded,
        })
    }
}

/// Validated, immutable book configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookConfig {
    #[serde(rename = "colors")]
    pub palette: Palette,
    pub yap_size: YapSize,
    pub page_count: u32,
    pub view_variant: ViewVariant,
    #[serde(rename = "isExploded")]
    pub exploded: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            yap_size: YapSize::Standard,
            page_count: DEFAULT_PAGE_COUNT,
            view_variant: ViewVariant::Closed,
            exploded: false,
        }
    }
}

impl BookConfig {
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_yap_size(mut self, yap_size: YapSize) -> Self {
        self.yap_size = yap_size;
        self
    }

    /// Set the page count, clamped into `1..=MAX_PAGE_COUNT`.
    ///
    /// Builders are for trusted callers; raw input goes through
    /// [`BookConfigInput::validate`], which rejects out-of-range counts instead.
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count.clamp(1, MAX_PAGE_COUNT);
        self
    }

    pub fn with_view_variant(mut self, view_variant: ViewVariant) -> Self {
        self.view_variant = view_variant;
        self
    }

    pub fn with_exploded(mut self, exploded: bool) -> Self {
        self.exploded = exploded;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_input_validates() {
        let config = BookConfigInput::default().validate().unwrap();
        assert_eq!(config, BookConfig::default());
    }

    #[test]
    fn test_missing_color_is_error() {
        let mut input = BookConfigInput::default();
        input.colors.remove("ribbon-2");
        assert_eq!(
            input.validate(),
            Err(ConfigurationError::MissingColor(ComponentId::Ribbon2))
        );
    }

    #[test]
    fn test_unknown_color_keys_ignored() {
        let mut input = BookConfigInput::default();
        input.colors.insert("bookmark".to_string(), "not a color".to_string());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_invalid_color_is_error() {
        let mut input = BookConfigInput::default();
        input.colors.insert("guilding".to_string(), "gold".to_string());
        assert!(matches!(
            input.validate(),
            Err(ConfigurationError::InvalidColor { component: ComponentId::Guilding, .. })
        ));
    }

    #[test]
    fn test_unknown_yap_falls_back_to_standard() {
        let input = BookConfigInput {
            yap_size: "enormous".to_string(),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap().yap_size, YapSize::Standard);
    }

    #[test]
    fn test_unknown_view_variant_is_error() {
        let input = BookConfigInput {
            view_variant: "exploded".to_string(),
            ..Default::default()
        };
        assert_eq!(
            input.validate(),
            Err(ConfigurationError::UnknownViewVariant("exploded".to_string()))
        );
    }

    #[test]
    fn test_non_positive_page_count_is_error() {
        for count in [0, -5] {
            let input = BookConfigInput {
                page_count: count,
                ..Default::default()
            };
            assert_eq!(input.validate(), Err(ConfigurationError::InvalidPageCount(count)));
        }
    }

    #[test]
    fn test_page_count_upper_bound() {
        let at_limit = BookConfigInput {
            page_count: MAX_PAGE_COUNT as i64,
            ..Default::default()
        };
        assert_eq!(at_limit.validate().unwrap().page_count, MAX_PAGE_COUNT);

        for count in [MAX_PAGE_COUNT as i64 + 1, 4_000_000_000] {
            let input = BookConfigInput {
                page_count: count,
                ..Default::default()
            };
            assert_eq!(input.validate(), Err(ConfigurationError::InvalidPageCount(count)));
        }
        let message = ConfigurationError::InvalidPageCount(10_001).to_string();
        assert_eq!(message, "page count must be between 1 and 10000, got 10001");
    }

    #[test]
    fn test_page_count_builder_clamps() {
        assert_eq!(BookConfig::default().with_page_count(0).page_count, 1);
        assert_eq!(
            BookConfig::default().with_page_count(u32::MAX).page_count,
            MAX_PAGE_COUNT
        );
    }

    #[test]
    fn test_preset_with_override() {
        let mut colors = BTreeMap::new();
        colors.insert("ribbon-1".to_string(), "#ff0000".to_string());
        let input = BookConfigInput {
            colors,
            preset: Some("ornate".to_string()),
            ..Default::default()
        };
        let config = input.validate().unwrap();
        assert_eq!(config.palette.get(ComponentId::Ribbon1), Rgb::new(255, 0, 0));
        assert_eq!(
            config.palette.get(ComponentId::OuterLeather),
            Preset::Ornate.palette().get(ComponentId::OuterLeather)
        );
    }

    #[test]
    fn test_parse_camel_case_json() {
        let json = r##"{
            "colors": {
                "outer-leather": "#513520",
                "inner-leather": "#8B4513",
                "guilding": "#ffd700",
                "ribbon-1": "#513520",
                "ribbon-2": "#513520",
                "ribbon-3": "hsl(200, 50%, 30%)"
            },
            "yapSize": "full",
            "pageCount": 4,
            "viewVariant": "closed",
            "isExploded": true
        }"##;
        let config = BookConfigInput::from_json(json).unwrap().validate().unwrap();
        assert_eq!(config.yap_size, YapSize::Full);
        assert_eq!(config.page_count, 4);
        assert!(config.exploded);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let input = BookConfigInput::from_json(r#"{"viewVariant": "open"}"#).unwrap();
        let config = input.validate().unwrap();
        assert_eq!(config.view_variant, ViewVariant::Open);
        assert_eq!(config.page_count, DEFAULT_PAGE_COUNT);
    }

    #[test]
    fn test_preset_only_json() {
        let input = BookConfigInput::from_json(r#"{"preset": "Rustic"}"#).unwrap();
        assert!(input.colors.is_empty());
        let config = input.validate().unwrap();
        assert_eq!(config.palette, Preset::Rustic.palette());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"yapSize": "half", "pageCount": 20}}"#).unwrap();
        let config = BookConfigInput::load(file.path()).unwrap().validate().unwrap();
        assert_eq!(config.yap_size, YapSize::Half);
        assert_eq!(config.page_count, 20);
    }

    #[test]
    fn test_component_id_round_trip() {
        for id in ComponentId::ALL {
            assert_eq!(id.as_str().parse::<ComponentId>(), Ok(id));
        }
    }
}
