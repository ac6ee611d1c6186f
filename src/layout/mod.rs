//! Procedural book geometry.
//!
//! [`LayoutEngine::layout`] turns a [`BookConfig`] into an ordered list of
//! [`ComponentDescriptor`]s: primitive shapes with a placement and a material.
//! The closed and open variants are separate functions; they share
//! constants and descriptor types but no placement math.

mod closed;
pub mod jitter;
mod open;

pub use jitter::{JitterKind, JitterSource, NoJitter, SeededJitter, ThreadJitter};

use crate::config::{BookConfig, BookConfigInput, ComponentId, Palette, ViewVariant};
use crate::error::Result;
use crate::types::{Rgb, Transform};
use serde::{Serialize, Serializer};
use std::fmt;

/// Thickness of the full page block along its stacking axis.
pub const BLOCK_THICKNESS: f32 = 0.8;

/// Which stack a page slice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageSide {
    /// The single stack of a closed book.
    Block,
    Left,
    Right,
}

/// Stable identity of a scene component across layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartId {
    Page { side: PageSide, index: u32 },
    SpineOuter,
    SpineInner,
    FrontOuter,
    FrontInner,
    BackOuter,
    BackInner,
    LeftOuter,
    RightOuter,
    LeftInner,
    RightInner,
    /// Curved spine of the open book.
    Spine,
    /// Ribbon number 1..=3.
    Ribbon(u8),
}

impl PartId {
    pub fn is_page(&self) -> bool {
        matches!(self, PartId::Page { .. })
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartId::Page { side: PageSide::Block, index } => write!(f, "page-{}", index),
            PartId::Page { side: PageSide::Left, index } => write!(f, "page-left-{}", index),
            PartId::Page { side: PageSide::Right, index } => write!(f, "page-right-{}", index),
            PartId::SpineOuter => f.write_str("spine-outer"),
            PartId::SpineInner => f.write_str("spine-inner"),
            PartId::FrontOuter => f.write_str("front-outer"),
            PartId::FrontInner => f.write_str("front-inner"),
            PartId::BackOuter => f.write_str("back-outer"),
            PartId::BackInner => f.write_str("back-inner"),
            PartId::LeftOuter => f.write_str("left-outer"),
            PartId::RightOuter => f.write_str("right-outer"),
            PartId::LeftInner => f.write_str("left-inner"),
            PartId::RightInner => f.write_str("right-inner"),
            PartId::Spine => f.write_str("spine"),
            PartId::Ribbon(n) => write!(f, "ribbon-{}", n),
        }
    }
}

impl Serialize for PartId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Primitive shape with its dimension parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    /// Axis-aligned box centered on its origin.
    Box { width: f32, height: f32, depth: f32 },
    /// Open-ended partial cylinder around the local Y axis.
    ///
    /// Angles follow the usual convention where `theta = 0` points along +Z
    /// and increases towards +X.
    #[serde(rename_all = "camelCase")]
    CylinderShell {
        radius: f32,
        height: f32,
        radial_segments: u32,
        theta_start: f32,
        theta_length: f32,
    },
}

impl Shape {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Shape::Box { width, height, depth }
    }

    /// Width, height and depth of the local bounding box.
    pub fn extents(&self) -> [f32; 3] {
        match *self {
            Shape::Box { width, height, depth } => [width, height, depth],
            Shape::CylinderShell { radius, height, .. } => [radius * 2.0, height, radius * 2.0],
        }
    }
}

/// Physically based surface parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Palette entry the color came from.
    pub color_source: ComponentId,
    pub color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub double_sided: bool,
}

impl Material {
    pub fn new(palette: &Palette, source: ComponentId, roughness: f32, metalness: f32) -> Self {
        Self {
            color_source: source,
            color: palette.get(source),
            roughness,
            metalness,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            double_sided: false,
        }
    }

    pub fn with_clearcoat(mut self, clearcoat: f32, clearcoat_roughness: f32) -> Self {
        self.clearcoat = clearcoat;
        self.clearcoat_roughness = clearcoat_roughness;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

/// Static shape/material record for one scene component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub id: PartId,
    pub shape: Shape,
    /// Assembled (closed) position.
    pub base_position: [f32; 3],
    /// XYZ Euler angles in radians.
    pub rotation: [f32; 3],
    pub material: Material,
    /// Position in the exploded view. `Some` marks the component as animatable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploded_position: Option<[f32; 3]>,
}

impl ComponentDescriptor {
    pub fn new(id: PartId, shape: Shape, base_position: [f32; 3], material: Material) -> Self {
        Self {
            id,
            shape,
            base_position,
            rotation: [0.0; 3],
            material,
            exploded_position: None,
        }
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.base_position = transform.position;
        self.rotation = transform.rotation;
        self
    }

    /// Mark as animatable, displaced by `offset` when exploded.
    pub fn exploding_by(mut self, offset: [f32; 3]) -> Self {
        self.exploded_position = Some([
            self.base_position[0] + offset[0],
            self.base_position[1] + offset[1],
            self.base_position[2] + offset[2],
        ]);
        self
    }

    pub fn is_animatable(&self) -> bool {
        self.exploded_position.is_some()
    }

    /// Where this component rests for the given explode state.
    pub fn target(&self, exploded: bool) -> [f32; 3] {
        match self.exploded_position {
            Some(position) if exploded => position,
            _ => self.base_position,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.base_position, self.rotation)
    }
}

/// Geometry generator with an injected jitter source.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine<J = SeededJitter> {
    jitter: J,
}

impl LayoutEngine<SeededJitter> {
    /// Engine with deterministic jitter from the default seed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_jitter(SeededJitter::new(seed))
    }
}

impl<J: JitterSource> LayoutEngine<J> {
    pub fn with_jitter(jitter: J) -> Self {
        Self { jitter }
    }

    pub fn jitter(&self) -> &J {
        &self.jitter
    }

    /// Produce the full descriptor list for a configuration.
    pub fn layout(&mut self, config: &BookConfig) -> Vec<ComponentDescriptor> {
        let descriptors = match config.view_variant {
            ViewVariant::Closed => closed::layout(config, &mut self.jitter),
            ViewVariant::Open => open::layout(config, &mut self.jitter),
        };
        log::debug!(
            "Laid out {:?} book: {} pages, yap {:?}, {} components",
            config.view_variant,
            config.page_count,
            config.yap_size,
            descriptors.len()
        );
        descriptors
    }

    /// Validate raw UI input, then lay it out.
    pub fn layout_input(&mut self, input: &BookConfigInput) -> Result<Vec<ComponentDescriptor>> {
        let config = input.validate()?;
        Ok(self.layout(&config))
    }
}

/// Nominal size scaled by `1 + jitter` for both page dimensions.
pub(crate) fn jittered_page<J: JitterSource + ?Sized>(
    jitter: &mut J,
    index: usize,
    width: f32,
    height: f32,
) -> (f32, f32) {
    let dw = jitter.jitter(JitterKind::PageWidth, index);
    let dh = jitter.jitter(JitterKind::PageHeight, index);
    (width * (1.0 + dw), height * (1.0 + dh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YapSize;
    use crate::error::{BookError, ConfigurationError};

    #[test]
    fn test_variant_dispatch_counts() {
        let mut engine = LayoutEngine::new();
        let closed = engine.layout(&BookConfig::default());
        assert_eq!(closed.len(), 100 + 9);
        let open = engine.layout(&BookConfig::default().with_view_variant(ViewVariant::Open));
        assert_eq!(open.len(), 100 + 8);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let config = BookConfig::default().with_yap_size(YapSize::Half);
        let a = LayoutEngine::with_seed(3).layout(&config);
        let b = LayoutEngine::with_seed(3).layout(&config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeat_layout_does_not_pop() {
        let mut engine = LayoutEngine::new();
        let config = BookConfig::default();
        let first = engine.layout(&config);
        // A color change must leave every page where it was
        let recolored = config.with_palette(crate::config::Preset::Rustic.palette());
        let second = engine.layout(&recolored);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.shape, b.shape);
            assert_eq!(a.base_position, b.base_position);
        }
    }

    #[test]
    fn test_unseeded_layout_keeps_structure() {
        let config = BookConfig::default().with_page_count(10);
        let mut engine = LayoutEngine::with_jitter(ThreadJitter::default());
        let a = engine.layout(&config);
        let b = engine.layout(&config);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.rotation, y.rotation);
            assert_eq!(x.base_position, y.base_position);
            assert_eq!(x.shape.extents()[2], y.shape.extents()[2]);
        }
    }

    #[test]
    fn test_layout_input_rejects_bad_variant() {
        let input = BookConfigInput {
            view_variant: "sideways".to_string(),
            ..Default::default()
        };
        let err = LayoutEngine::new().layout_input(&input).unwrap_err();
        assert!(matches!(
            err,
            BookError::Configuration(ConfigurationError::UnknownViewVariant(_))
        ));
    }

    #[test]
    fn test_part_id_names() {
        assert_eq!(PartId::Page { side: PageSide::Left, index: 7 }.to_string(), "page-left-7");
        assert_eq!(PartId::Ribbon(2).to_string(), "ribbon-2");
        assert_eq!(PartId::FrontOuter.to_string(), "front-outer");
    }

    #[test]
    fn test_descriptor_serializes_shape_tag() {
        let descriptors = LayoutEngine::new().layout(&BookConfig::default().with_page_count(1));
        let json = serde_json::to_value(descriptors[1]).unwrap();
        assert_eq!(json["id"], "spine-outer");
        assert_eq!(json["shape"]["type"], "box");
        assert!(json["explodedPosition"].is_array());
    }
}
