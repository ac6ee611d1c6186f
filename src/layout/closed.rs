//! Closed book: page block, two-layer leather case, hanging ribbons.
//!
//! The case is built from three panels (spine, front, back), each an outer
//! leather box with a thinner liner set slightly inward along the panel
//! normal. Yap grows panel height by the full offset and front/back width by
//! half of it; the front/back boxes shift by half their width growth so the
//! spine-side edge stays put and only the fore edge overhangs.

use super::{
    jittered_page, ComponentDescriptor, JitterSource, Material, PageSide, PartId, Shape,
    BLOCK_THICKNESS,
};
use crate::config::{BookConfig, ComponentId, MAX_PAGE_COUNT};

pub(crate) const BLOCK_WIDTH: f32 = 2.2;
pub(crate) const BLOCK_HEIGHT: f32 = 3.2;

const SPINE_OUTER_X: f32 = -1.15;
const SPINE_INNER_X: f32 = -1.1;
const PANEL_X: f32 = 0.1;
const OUTER_Z: f32 = 0.45;
const INNER_Z: f32 = 0.4;

/// How far each layer travels when exploded.
pub(crate) const OUTER_EXPLODE: f32 = 0.9;
pub(crate) const INNER_EXPLODE: f32 = 0.5;

const RIBBON_X: [f32; 3] = [-0.4, 0.0, 0.4];
// Keeps the ribbons from z-fighting with each other and the covers
const RIBBON_Z: [f32; 3] = [-0.01, 0.0, 0.01];
const RIBBON_Y: f32 = -2.1;

pub(super) fn layout<J: JitterSource + ?Sized>(
    config: &BookConfig,
    jitter: &mut J,
) -> Vec<ComponentDescriptor> {
    let palette = &config.palette;
    let yap = config.yap_size.offset();
    let count = config.page_count.clamp(1, MAX_PAGE_COUNT);

    let mut out = Vec::with_capacity(count as usize + 9);

    // Page stack: exact slices, jitter on width/height only
    let page_material = Material::new(palette, ComponentId::Guilding, 0.2, 0.8);
    let slice = BLOCK_THICKNESS / count as f32;
    for i in 0..count {
        let (width, height) = jittered_page(jitter, i as usize, BLOCK_WIDTH, BLOCK_HEIGHT);
        let z = (i as f32 - count as f32 / 2.0) * slice;
        out.push(ComponentDescriptor::new(
            PartId::Page { side: PageSide::Block, index: i },
            Shape::cuboid(width, height, slice),
            [0.0, 0.0, z],
            page_material,
        ));
    }

    let outer = Material::new(palette, ComponentId::OuterLeather, 0.9, 0.1);
    let inner = Material::new(palette, ComponentId::InnerLeather, 0.9, 0.1);

    // Spine
    out.push(
        ComponentDescriptor::new(
            PartId::SpineOuter,
            Shape::cuboid(0.1, 3.6 + yap, BLOCK_THICKNESS),
            [SPINE_OUTER_X, 0.0, 0.0],
            outer,
        )
        .exploding_by([-OUTER_EXPLODE, 0.0, 0.0]),
    );
    out.push(
        ComponentDescriptor::new(
            PartId::SpineInner,
            Shape::cuboid(0.025, 3.5 + yap, BLOCK_THICKNESS),
            [SPINE_INNER_X, 0.0, 0.0],
            inner,
        )
        .exploding_by([-INNER_EXPLODE, 0.0, 0.0]),
    );

    // Front and back boards
    let panel_x = PANEL_X + yap / 4.0;
    for (sign, outer_id, inner_id) in [
        (1.0, PartId::FrontOuter, PartId::FrontInner),
        (-1.0, PartId::BackOuter, PartId::BackInner),
    ] {
        out.push(
            ComponentDescriptor::new(
                outer_id,
                Shape::cuboid(2.6 + yap / 2.0, 3.6 + yap, 0.1),
                [panel_x, 0.0, sign * OUTER_Z],
                outer,
            )
            .exploding_by([0.0, 0.0, sign * OUTER_EXPLODE]),
        );
        out.push(
            ComponentDescriptor::new(
                inner_id,
                Shape::cuboid(2.5 + yap / 2.0, 3.5 + yap, 0.025),
                [panel_x, 0.0, sign * INNER_Z],
                inner,
            )
            .exploding_by([0.0, 0.0, sign * INNER_EXPLODE]),
        );
    }

    // Ribbons hang below the block and never move
    for (n, (x, z)) in RIBBON_X.iter().zip(RIBBON_Z.iter()).enumerate() {
        let number = n + 1;
        let source = ComponentId::ribbon(number).unwrap_or(ComponentId::Ribbon1);
        out.push(ComponentDescriptor::new(
            PartId::Ribbon(number as u8),
            Shape::cuboid(0.3, 2.0, 0.01),
            [*x, RIBBON_Y, *z],
            Material::new(palette, source, 0.7, 0.1),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YapSize;
    use crate::layout::{LayoutEngine, NoJitter};

    const EPS: f32 = 1e-5;

    fn pages(descriptors: &[ComponentDescriptor]) -> Vec<&ComponentDescriptor> {
        descriptors.iter().filter(|d| d.id.is_page()).collect()
    }

    fn find(descriptors: &[ComponentDescriptor], id: PartId) -> &ComponentDescriptor {
        descriptors.iter().find(|d| d.id == id).unwrap()
    }

    #[test]
    fn test_four_page_full_yap_scenario() {
        let config = BookConfig::default()
            .with_yap_size(YapSize::Full)
            .with_page_count(4);
        let descriptors = LayoutEngine::new().layout(&config);

        assert_eq!(descriptors.len(), 13);
        let pages = pages(&descriptors);
        assert_eq!(pages.len(), 4);
        let expected_z = [-0.4, -0.2, 0.0, 0.2];
        for (page, z) in pages.iter().zip(expected_z) {
            assert!((page.shape.extents()[2] - 0.2).abs() < EPS);
            assert!((page.base_position[2] - z).abs() < EPS);
        }
        let covers = descriptors.iter().filter(|d| d.is_animatable()).count();
        assert_eq!(covers, 6);
        let ribbons = descriptors.iter().filter(|d| matches!(d.id, PartId::Ribbon(_))).count();
        assert_eq!(ribbons, 3);
    }

    #[test]
    fn test_hand_built_page_count_is_bounded() {
        let config = BookConfig {
            page_count: u32::MAX,
            ..BookConfig::default()
        };
        let descriptors = LayoutEngine::with_jitter(NoJitter).layout(&config);
        assert_eq!(pages(&descriptors).len(), MAX_PAGE_COUNT as usize);
        assert_eq!(descriptors.len(), MAX_PAGE_COUNT as usize + 9);
    }

    #[test]
    fn test_page_stack_tiles_block() {
        for count in [1, 2, 3, 7, 50, 100, 333] {
            let config = BookConfig::default().with_page_count(count);
            let descriptors = LayoutEngine::new().layout(&config);
            let pages = pages(&descriptors);
            assert_eq!(pages.len(), count as usize);

            let total: f32 = pages.iter().map(|p| p.shape.extents()[2]).sum();
            assert!((total - BLOCK_THICKNESS).abs() < 1e-4, "count {count}: total {total}");

            for pair in pages.windows(2) {
                let a_far = pair[0].base_position[2] + pair[0].shape.extents()[2] / 2.0;
                let b_near = pair[1].base_position[2] - pair[1].shape.extents()[2] / 2.0;
                assert!((a_far - b_near).abs() < 1e-5, "gap between slices");
            }
        }
    }

    #[test]
    fn test_page_jitter_is_subtle() {
        let descriptors = LayoutEngine::new().layout(&BookConfig::default());
        for page in pages(&descriptors) {
            let [w, h, _] = page.shape.extents();
            assert!((w - BLOCK_WIDTH).abs() <= BLOCK_WIDTH * 0.005 + EPS);
            assert!((h - BLOCK_HEIGHT).abs() <= BLOCK_HEIGHT * 0.005 + EPS);
        }
    }

    #[test]
    fn test_yap_grows_panels_monotonically() {
        let mut engine = LayoutEngine::with_jitter(NoJitter);
        let layouts: Vec<_> = YapSize::ALL
            .iter()
            .map(|yap| engine.layout(&BookConfig::default().with_yap_size(*yap)))
            .collect();

        for id in [
            PartId::SpineOuter,
            PartId::SpineInner,
            PartId::FrontOuter,
            PartId::FrontInner,
            PartId::BackOuter,
            PartId::BackInner,
        ] {
            for pair in layouts.windows(2) {
                let small = find(&pair[0], id).shape.extents();
                let large = find(&pair[1], id).shape.extents();
                assert!(large[0] >= small[0] && large[1] >= small[1], "{id} shrank");
            }
        }
    }

    #[test]
    fn test_yap_keeps_spine_edge_flush() {
        let mut engine = LayoutEngine::with_jitter(NoJitter);
        for id in [PartId::FrontOuter, PartId::FrontInner, PartId::BackOuter, PartId::BackInner] {
            let edges: Vec<(f32, f32)> = YapSize::ALL
                .iter()
                .map(|yap| {
                    let layout = engine.layout(&BookConfig::default().with_yap_size(*yap));
                    let d = find(&layout, id);
                    let half = d.shape.extents()[0] / 2.0;
                    (d.base_position[0] - half, d.base_position[0] + half)
                })
                .collect();
            assert!((edges[0].0 - edges[1].0).abs() < EPS);
            assert!((edges[0].0 - edges[2].0).abs() < EPS);
            assert!(edges[2].1 > edges[1].1 && edges[1].1 > edges[0].1);
        }
    }

    #[test]
    fn test_explode_moves_covers_outward() {
        let descriptors = LayoutEngine::new().layout(&BookConfig::default());
        let front = find(&descriptors, PartId::FrontOuter);
        assert!(front.target(true)[2] > front.target(false)[2]);
        let back = find(&descriptors, PartId::BackInner);
        assert!(back.target(true)[2] < back.target(false)[2]);
        let spine = find(&descriptors, PartId::SpineOuter);
        assert!(spine.target(true)[0] < spine.target(false)[0]);
        // Outer layer travels further than its liner
        let front_inner = find(&descriptors, PartId::FrontInner);
        assert!(front.target(true)[2] > front_inner.target(true)[2]);
    }

    #[test]
    fn test_ribbons_static_and_colored() {
        let descriptors = LayoutEngine::new().layout(&BookConfig::default());
        for n in 1..=3u8 {
            let ribbon = find(&descriptors, PartId::Ribbon(n));
            assert!(!ribbon.is_animatable());
            assert_eq!(
                ribbon.material.color_source,
                ComponentId::ribbon(n as usize).unwrap()
            );
        }
    }
}
