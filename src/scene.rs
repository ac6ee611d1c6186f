//! Per-frame scene assembly.
//!
//! [`assemble`] merges the static descriptor list with live spring positions.
//! [`BookScene`] owns both update paths: configuration changes (relayout and
//! reschedule) and animation ticks. Both take `&mut self`, so a host loop
//! cannot interleave them.

use crate::animation::{SpringConfig, SpringState, SpringTransitionEngine, MAX_DT};
use crate::config::{BookConfig, BookConfigInput};
use crate::error::Result;
use crate::layout::{
    ComponentDescriptor, JitterSource, LayoutEngine, Material, PartId, SeededJitter, Shape,
};
use crate::types::{BoundingBox, Transform};
use serde::Serialize;
use std::collections::HashMap;

/// Anything that can report a live position for an animated part.
pub trait PositionSource {
    fn position(&self, id: &PartId) -> Option<[f32; 3]>;
}

impl PositionSource for SpringTransitionEngine {
    fn position(&self, id: &PartId) -> Option<[f32; 3]> {
        SpringTransitionEngine::position(self, id)
    }
}

impl PositionSource for HashMap<PartId, SpringState> {
    fn position(&self, id: &PartId) -> Option<[f32; 3]> {
        self.get(id).map(|s| s.position.to_array())
    }
}

/// One drawable component with its final world transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderItem {
    pub id: PartId,
    pub shape: Shape,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub material: Material,
    /// Position came from a spring rather than the static layout.
    pub animated: bool,
}

impl RenderItem {
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }
}

/// Ordered list of components handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderList {
    pub items: Vec<RenderItem>,
}

impl RenderList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderItem> {
        self.items.iter()
    }

    pub fn get(&self, id: &PartId) -> Option<&RenderItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Bounds of all item origins. Shapes extend beyond this by their half extents.
    pub fn origin_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.items.iter().map(|item| item.position))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a RenderList {
    type Item = &'a RenderItem;
    type IntoIter = std::slice::Iter<'a, RenderItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Merge static descriptors with live positions. Inputs are left untouched.
///
/// Animatable descriptors without a live spring (e.g. laid out this frame,
/// before the next tick) fall back to their base position.
pub fn assemble<P: PositionSource + ?Sized>(
    descriptors: &[ComponentDescriptor],
    springs: &P,
) -> RenderList {
    let items = descriptors
        .iter()
        .map(|d| {
            let live = if d.is_animatable() { springs.position(&d.id) } else { None };
            RenderItem {
                id: d.id,
                shape: d.shape,
                position: live.unwrap_or(d.base_position),
                rotation: d.rotation,
                material: d.material,
                animated: live.is_some(),
            }
        })
        .collect();
    RenderList { items }
}

/// A complete interactive book: layout, springs and assembly behind one loop.
#[derive(Debug, Clone)]
pub struct BookScene<J = SeededJitter> {
    layout: LayoutEngine<J>,
    springs: SpringTransitionEngine,
    config: BookConfig,
    descriptors: Vec<ComponentDescriptor>,
}

impl BookScene<SeededJitter> {
    /// Scene with deterministic jitter and default spring constants.
    pub fn new(config: BookConfig) -> Self {
        Self::with_parts(LayoutEngine::new(), SpringConfig::default(), config)
    }

    /// Validate raw UI input and build a scene from it.
    pub fn from_input(input: &BookConfigInput) -> Result<Self> {
        Ok(Self::new(input.validate()?))
    }
}

impl<J: JitterSource> BookScene<J> {
    pub fn with_parts(layout: LayoutEngine<J>, springs: SpringConfig, config: BookConfig) -> Self {
        let mut scene = Self {
            layout,
            springs: SpringTransitionEngine::new(springs),
            config,
            descriptors: Vec::new(),
        };
        scene.relayout();
        // Materialize springs at rest so the first frame is already assembled
        scene.springs.tick(0.0);
        scene
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    pub fn springs(&self) -> &SpringTransitionEngine {
        &self.springs
    }

    /// Configuration-change path. An explode toggle alone just retargets the
    /// springs; any other change regenerates the descriptors.
    pub fn apply_config(&mut self, config: BookConfig) {
        let previous = std::mem::replace(&mut self.config, config);
        let descriptors_changed = previous.palette != config.palette
            || previous.yap_size != config.yap_size
            || previous.page_count != config.page_count
            || previous.view_variant != config.view_variant;

        if descriptors_changed {
            self.relayout();
        } else if previous.exploded != config.exploded {
            self.springs.schedule_from(&self.descriptors, config.exploded);
        }
    }

    /// Validate and apply raw UI input. On error the scene is left unchanged.
    pub fn apply_input(&mut self, input: &BookConfigInput) -> Result<()> {
        let config = input.validate()?;
        self.apply_config(config);
        Ok(())
    }

    pub fn set_exploded(&mut self, exploded: bool) {
        self.apply_config(self.config.with_exploded(exploded));
    }

    pub fn toggle_exploded(&mut self) {
        self.set_exploded(!self.config.exploded);
    }

    /// Animation-tick path, once per displayed frame.
    pub fn tick(&mut self, dt: f32) {
        self.springs.tick(dt);
    }

    /// Tick at a fixed rate until at rest or `max_seconds` have elapsed.
    /// Returns the simulated time, which counts each step at most `MAX_DT`.
    /// A non-finite or non-positive `dt` simulates nothing.
    pub fn settle(&mut self, dt: f32, max_seconds: f32) -> f32 {
        self.tick(0.0);
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        let step = dt.min(MAX_DT);
        let mut elapsed = 0.0;
        while !self.springs.is_settled() && elapsed < max_seconds {
            self.tick(step);
            elapsed += step;
        }
        elapsed
    }

    pub fn render_list(&self) -> RenderList {
        assemble(&self.descriptors, &self.springs)
    }

    fn relayout(&mut self) {
        self.descriptors = self.layout.layout(&self.config);
        self.springs.schedule_from(&self.descriptors, self.config.exploded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, ViewVariant, YapSize};

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_assemble_without_springs_passes_through() {
        let descriptors = LayoutEngine::new().layout(&BookConfig::default().with_page_count(3));
        let empty: HashMap<PartId, SpringState> = HashMap::new();
        let list = assemble(&descriptors, &empty);
        assert_eq!(list.len(), descriptors.len());
        for (item, d) in list.iter().zip(descriptors.iter()) {
            assert_eq!(item.id, d.id);
            assert_eq!(item.position, d.base_position);
            assert!(!item.animated);
        }
    }

    #[test]
    fn test_assemble_substitutes_animatable_only() {
        let descriptors = LayoutEngine::new().layout(&BookConfig::default().with_page_count(3));
        let mut springs = HashMap::new();
        springs.insert(PartId::FrontOuter, SpringState::at_rest(glam::Vec3::new(9.0, 9.0, 9.0)));
        // A spring for a static part is ignored
        springs.insert(PartId::Ribbon(1), SpringState::at_rest(glam::Vec3::ZERO));

        let copy = descriptors.clone();
        let list = assemble(&descriptors, &springs);
        assert_eq!(descriptors, copy);

        assert_eq!(list.get(&PartId::FrontOuter).unwrap().position, [9.0, 9.0, 9.0]);
        let ribbon = list.get(&PartId::Ribbon(1)).unwrap();
        assert_eq!(ribbon.position, [-0.4, -2.1, -0.01]);
        assert!(!ribbon.animated);
    }

    #[test]
    fn test_scene_explodes_over_time() {
        let mut scene = BookScene::new(BookConfig::default().with_page_count(10));
        let closed = scene.render_list();
        let front_closed = closed.get(&PartId::FrontOuter).unwrap().position;
        assert!(closed.get(&PartId::FrontOuter).unwrap().animated);

        scene.set_exploded(true);
        // Toggle alone moves nothing until the frame ticks
        assert_eq!(scene.render_list(), closed);

        scene.tick(FRAME);
        let moving = scene.render_list().get(&PartId::FrontOuter).unwrap().position;
        assert!(moving[2] > front_closed[2]);

        scene.settle(FRAME, 10.0);
        let front = scene.descriptors().iter().find(|d| d.id == PartId::FrontOuter).unwrap();
        assert_eq!(
            Some(scene.render_list().get(&PartId::FrontOuter).unwrap().position),
            front.exploded_position
        );
    }

    #[test]
    fn test_settle_with_degenerate_dt_returns() {
        let mut scene = BookScene::new(BookConfig::default().with_page_count(10));
        scene.set_exploded(true);
        for dt in [0.0, -FRAME, f32::NAN, f32::INFINITY] {
            assert_eq!(scene.settle(dt, 1.0), 0.0);
        }
        assert!(!scene.springs().is_settled());
    }

    #[test]
    fn test_settle_counts_clamped_steps() {
        let mut scene = BookScene::new(BookConfig::default().with_page_count(10));
        scene.set_exploded(true);
        // Three clamped steps, not one full second
        let elapsed = scene.settle(1.0, 0.25);
        assert!((elapsed - 3.0 * MAX_DT).abs() < 1e-5, "elapsed {}", elapsed);
    }

    #[test]
    fn test_yap_change_animates_instead_of_snapping() {
        let mut scene = BookScene::new(BookConfig::default().with_page_count(10));
        let before = scene.render_list().get(&PartId::FrontOuter).unwrap().position;
        scene.apply_config(scene.config().with_yap_size(YapSize::Full));
        // Layout moved the base, the spring has not caught up yet
        scene.tick(0.0);
        let after = scene.render_list().get(&PartId::FrontOuter).unwrap().position;
        assert_eq!(before, after);
        scene.settle(FRAME, 10.0);
        let settled = scene.render_list().get(&PartId::FrontOuter).unwrap().position;
        assert!((settled[0] - (0.1 + 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_color_change_keeps_pages_in_place() {
        let mut scene = BookScene::new(BookConfig::default());
        let before = scene.render_list();
        scene.apply_config(scene.config().with_palette(Preset::Ornate.palette()));
        let after = scene.render_list();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.shape, b.shape);
            assert_eq!(a.position, b.position);
        }
        assert_ne!(before, after);
    }

    #[test]
    fn test_switch_to_open_variant() {
        let mut scene = BookScene::new(BookConfig::default().with_exploded(true));
        scene.apply_config(scene.config().with_view_variant(ViewVariant::Open));
        scene.tick(FRAME);
        assert!(scene.springs().is_empty());
        assert_eq!(scene.render_list().len(), 108);
        assert!(scene.render_list().iter().all(|item| !item.animated));
    }

    #[test]
    fn test_bad_input_leaves_scene_unchanged() {
        let mut scene = BookScene::new(BookConfig::default());
        let input = BookConfigInput {
            page_count: 0,
            ..Default::default()
        };
        assert!(scene.apply_input(&input).is_err());
        assert_eq!(scene.config(), &BookConfig::default());
    }

    #[test]
    fn test_render_list_json() {
        let scene = BookScene::new(BookConfig::default().with_page_count(2));
        let json = scene.render_list().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["items"].as_array().unwrap().len(), 11);
        assert_eq!(value["items"][0]["material"]["colorSource"], "guilding");
    }
}
