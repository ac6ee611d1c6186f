//! Open book: two fanned page groups, hinged boards, curved spine.

use super::{
    jittered_page, BLOCK_THICKNESS, ComponentDescriptor, JitterSource, Material, PageSide,
    PartId, Shape,
};
use crate::config::{BookConfig, ComponentId, MAX_PAGE_COUNT};
use crate::types::compose_group;
use std::f32::consts::PI;

/// Angle between the two halves of the open book (120°).
pub const OPEN_ANGLE: f32 = PI * 2.0 / 3.0;

/// Rotation applied to each page group and board about the spine axis.
pub const LEAF_ROTATION: f32 = OPEN_ANGLE * 1.4;

const PAGE_WIDTH: f32 = 2.0;
const PAGE_HEIGHT: f32 = 3.2;
const PAGE_INSET: f32 = 0.025 / 2.0;
const FAN_START: f32 = -1.5;

const BOARD_X: f32 = 1.3;
const BOARD_OUTER_Z: f32 = 0.15;
const BOARD_INNER_Z: f32 = 0.2;

const SPINE_RADIUS: f32 = 0.2;
const SPINE_SEGMENTS: u32 = 32;

pub(super) fn layout<J: JitterSource + ?Sized>(
    config: &BookConfig,
    jitter: &mut J,
) -> Vec<ComponentDescriptor> {
    let palette = &config.palette;
    let yap = config.yap_size.offset();
    let count = config.page_count.clamp(1, MAX_PAGE_COUNT);
    let right_count = count / 2;
    let left_count = count - right_count;

    let mut out = Vec::with_capacity(count as usize + 8);

    let page_material = Material::new(palette, ComponentId::Guilding, 0.0, 0.0);
    let fan = LEAF_ROTATION.sin();

    // Left group first, then right. Jitter indices run across both groups.
    for (side, group_count, base_index, sign) in [
        (PageSide::Left, left_count, 0, -1.0_f32),
        (PageSide::Right, right_count, left_count, 1.0_f32),
    ] {
        if group_count == 0 {
            continue;
        }
        let slice = (BLOCK_THICKNESS / 2.0) / group_count as f32;
        for i in 0..group_count {
            let (width, height) =
                jittered_page(jitter, (base_index + i) as usize, PAGE_WIDTH, PAGE_HEIGHT);
            let step = i as f32 * slice;
            let z_offset = FAN_START + step;
            let x = sign * (1.0 - PAGE_INSET + step);
            out.push(
                ComponentDescriptor::new(
                    PartId::Page { side, index: i },
                    Shape::cuboid(width, height, slice),
                    [x, 0.0, -z_offset * fan],
                    page_material,
                )
                .with_rotation([0.0, sign * LEAF_ROTATION, 0.0]),
            );
        }
    }

    let outer =
        Material::new(palette, ComponentId::OuterLeather, 0.7, 0.1).with_clearcoat(0.1, 0.8);
    let inner =
        Material::new(palette, ComponentId::InnerLeather, 0.6, 0.1).with_clearcoat(0.2, 0.6);

    // Boards
    for (sign, id) in [(-1.0_f32, PartId::LeftOuter), (1.0, PartId::RightOuter)] {
        out.push(
            ComponentDescriptor::new(
                id,
                Shape::cuboid(2.45 + yap / 2.0, 3.45 + yap, 0.1),
                [sign * (BOARD_X + yap * 0.2), 0.0, BOARD_OUTER_Z],
                outer,
            )
            .with_rotation([0.0, sign * LEAF_ROTATION, 0.0]),
        );
    }
    for (sign, id) in [(-1.0_f32, PartId::LeftInner), (1.0, PartId::RightInner)] {
        out.push(
            ComponentDescriptor::new(
                id,
                Shape::cuboid(2.3, 3.35, 0.025),
                [sign * BOARD_X, 0.0, BOARD_INNER_Z],
                inner,
            )
            .with_rotation([0.0, sign * LEAF_ROTATION, 0.0]),
        );
    }

    // Spine shell spanning the opening
    out.push(ComponentDescriptor::new(
        PartId::Spine,
        Shape::CylinderShell {
            radius: SPINE_RADIUS,
            height: 3.45 + yap,
            radial_segments: SPINE_SEGMENTS,
            theta_start: OPEN_ANGLE,
            theta_length: OPEN_ANGLE,
        },
        [0.0, 0.0, 0.0],
        outer.double_sided(),
    ));

    // Ribbons are placed inside rotated groups
    let ribbons: [(u8, f32, [f32; 3]); 3] = [
        (1, -LEAF_ROTATION, [0.5, -2.1, 0.0]),
        (2, LEAF_ROTATION, [-0.5, -2.1, 0.0]),
        (3, LEAF_ROTATION, [-0.75, -2.1, 0.05]),
    ];
    for (number, group_angle, local) in ribbons {
        let source = ComponentId::ribbon(number as usize).unwrap_or(ComponentId::Ribbon1);
        out.push(
            ComponentDescriptor::new(
                PartId::Ribbon(number),
                Shape::cuboid(0.3, 2.0, 0.01),
                local,
                Material::new(palette, source, 0.5, 0.1).with_clearcoat(0.3, 0.4),
            )
            .with_transform(compose_group([0.0, group_angle, 0.0], local)),
        );
    }

    out
}
