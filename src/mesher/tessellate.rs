//! Triangle tessellation of primitive shapes.

use super::geometry::{Mesh, Vertex};
use crate::layout::Shape;
use crate::types::Transform;

/// Box faces as (normal, u, v) with `u × v = normal`, so corners walked
/// `-u-v, +u-v, +u+v, -u+v` are counter-clockwise from outside.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Tessellate a shape in its local frame.
pub fn tessellate(shape: &Shape) -> Mesh {
    match *shape {
        Shape::Box { width, height, depth } => box_mesh([width * 0.5, height * 0.5, depth * 0.5]),
        Shape::CylinderShell {
            radius,
            height,
            radial_segments,
            theta_start,
            theta_length,
        } => cylinder_shell(radius, height, radial_segments.max(1), theta_start, theta_length),
    }
}

/// Tessellate a shape and move it into world space.
pub fn tessellate_placed(shape: &Shape, transform: &Transform) -> Mesh {
    let mut mesh = tessellate(shape);
    for vertex in &mut mesh.vertices {
        vertex.position = transform.apply(vertex.position);
        vertex.normal = transform.rotate(vertex.normal);
    }
    mesh
}

/// Append a reversed copy with flipped normals, for viewers without
/// double-sided materials.
pub fn add_back_faces(mesh: &mut Mesh) {
    let offset = mesh.vertex_count() as u32;
    let back: Vec<Vertex> = mesh
        .vertices
        .iter()
        .map(|v| {
            let mut v = *v;
            v.normal = v.normal.map(|c| -c);
            v
        })
        .collect();
    let triangles: Vec<[u32; 3]> = mesh
        .indices
        .chunks_exact(3)
        .map(|t| [t[0] + offset, t[2] + offset, t[1] + offset])
        .collect();
    mesh.vertices.extend(back);
    for [a, b, c] in triangles {
        mesh.add_triangle(a, b, c);
    }
}

fn box_mesh(half: [f32; 3]) -> Mesh {
    let mut mesh = Mesh::new();
    let scale = |d: [f32; 3]| [d[0] * half[0], d[1] * half[1], d[2] * half[2]];

    for (normal, u, v) in BOX_FACES {
        let c = scale(normal);
        let u = scale(u);
        let v = scale(v);
        let corner = |su: f32, sv: f32| {
            [
                c[0] + su * u[0] + sv * v[0],
                c[1] + su * u[1] + sv * v[1],
                c[2] + su * u[2] + sv * v[2],
            ]
        };
        let i0 = mesh.add_vertex(Vertex::new(corner(-1.0, -1.0), normal));
        let i1 = mesh.add_vertex(Vertex::new(corner(1.0, -1.0), normal));
        let i2 = mesh.add_vertex(Vertex::new(corner(1.0, 1.0), normal));
        let i3 = mesh.add_vertex(Vertex::new(corner(-1.0, 1.0), normal));
        mesh.add_quad(i0, i1, i2, i3);
    }
    mesh
}

/// Open partial cylinder around Y. `theta = 0` points along +Z.
fn cylinder_shell(
    radius: f32,
    height: f32,
    segments: u32,
    theta_start: f32,
    theta_length: f32,
) -> Mesh {
    let mut mesh = Mesh::new();
    let half = height * 0.5;

    // Interleaved columns: bottom at 2s, top at 2s + 1
    for s in 0..=segments {
        let theta = theta_start + theta_length * s as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        let normal = [sin, 0.0, cos];
        mesh.add_vertex(Vertex::new([radius * sin, -half, radius * cos], normal));
        mesh.add_vertex(Vertex::new([radius * sin, half, radius * cos], normal));
    }
    for s in 0..segments {
        let bottom = 2 * s;
        let top = bottom + 1;
        mesh.add_quad(bottom, bottom + 2, top + 2, top);
    }
    mesh
}
